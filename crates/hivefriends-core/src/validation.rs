//! Multi-field form validation.
//!
//! A [`FormValidator`] holds the form's field values, an ordered rule list
//! per field, and the error state produced by the last
//! [`validate`](FormValidator::validate). Rules may be synchronous or
//! asynchronous; every rule of every ruled field runs concurrently and all
//! failures are reported together.
//!
//! ```ignore
//! let mut form = FormValidator::new([
//!     ("username", FieldValue::from("tmtu")),
//!     ("password", FieldValue::Absent),
//! ])
//! .rule("username", rules::min_length(3))
//! .rule("password", rules::required());
//!
//! let err = form.validate().await.unwrap_err();
//! assert!(err.field("password").is_some_and(FieldError::invalid));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

// ── Values ──────────────────────────────────────────────────────────

/// A single form field's current value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Absent,
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// Length for length-bounded rules. Absent values and numbers have none.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Text(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Absent | Self::Number(_) => None,
        }
    }

    /// True when absent or zero-length. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Number(_) => false,
            Self::Text(_) | Self::List(_) => self.len() == Some(0),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

// ── Rules ───────────────────────────────────────────────────────────

type SyncCheck = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;
type AsyncCheck = Arc<dyn Fn(FieldValue) -> BoxFuture<'static, bool> + Send + Sync>;

#[derive(Clone)]
enum Check {
    Sync(SyncCheck),
    Async(AsyncCheck),
}

/// A named predicate over one field value, with the message shown on
/// failure.
#[derive(Clone)]
pub struct Rule {
    kind: String,
    message: String,
    check: Check,
}

impl Rule {
    pub fn new<F>(kind: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: kind.into(),
            message: message.into(),
            check: Check::Sync(Arc::new(check)),
        }
    }

    pub fn new_async<F, Fut>(kind: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(FieldValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let check: AsyncCheck = Arc::new(move |value| Box::pin(check(value)));
        Self {
            kind: kind.into(),
            message: message.into(),
            check: Check::Async(check),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_async(&self) -> bool {
        matches!(self.check, Check::Async(_))
    }

    /// Evaluate the rule. `true` means the value passed.
    pub async fn check(&self, value: &FieldValue) -> bool {
        match &self.check {
            Check::Sync(f) => f(value),
            Check::Async(f) => f(value.clone()).await,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("async", &self.is_async())
            .finish()
    }
}

/// Built-in rules.
pub mod rules {
    use std::future::Future;
    use std::sync::LazyLock;

    use regex::Regex;

    use super::{FieldValue, Rule};

    static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    });

    /// Fails on an absent or zero-length value.
    pub fn required() -> Rule {
        Rule::new("required", "Value is required", |v| !v.is_empty())
    }

    /// Fails on an absent value or one shorter than `min`.
    pub fn min_length(min: usize) -> Rule {
        Rule::new(
            "min_length",
            format!("Value must be at least {min} characters long"),
            move |v| v.len().is_some_and(|len| len >= min),
        )
    }

    /// Fails on an absent value or one longer than `max`.
    pub fn max_length(max: usize) -> Rule {
        Rule::new(
            "max_length",
            format!("Value must be at most {max} characters long"),
            move |v| v.len().is_some_and(|len| len <= max),
        )
    }

    pub fn email() -> Rule {
        Rule::new("email", "Value must be a valid email address", |v| {
            v.as_text().is_some_and(|s| EMAIL.is_match(s))
        })
    }

    /// Delegate to an external asynchronous predicate.
    pub fn async_validation<F, Fut>(message: impl Into<String>, predicate: F) -> Rule
    where
        F: Fn(FieldValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Rule::new_async("async", message, predicate)
    }
}

// ── Errors ──────────────────────────────────────────────────────────

/// Error state of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldError {
    rule_kind: Option<String>,
    messages: IndexSet<String>,
}

impl FieldError {
    /// True iff at least one message is recorded.
    pub fn invalid(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Kind of the last failing rule.
    pub fn rule_kind(&self) -> Option<&str> {
        self.rule_kind.as_deref()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    fn record(&mut self, kind: &str, message: &str) {
        self.rule_kind = Some(kind.to_owned());
        self.messages.insert(message.to_owned());
    }
}

/// Every field's error state after a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: IndexMap<String, FieldError>,
}

impl ValidationErrors {
    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.fields.get(name)
    }

    /// Fields with at least one failing rule, in form order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields
            .iter()
            .filter(|(_, e)| e.invalid())
            .map(|(k, e)| (k.as_str(), e))
    }

    pub fn into_inner(self) -> IndexMap<String, FieldError> {
        self.fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.invalid_fields() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            let messages: Vec<&str> = error.messages().collect();
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ── Validator ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    fields: IndexMap<String, FieldValue>,
    rules: IndexMap<String, Vec<Rule>>,
    errors: IndexMap<String, FieldError>,
    any_error: bool,
    autoclear: bool,
}

impl FormValidator {
    pub fn new<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldValue)>) -> Self {
        let fields: IndexMap<String, FieldValue> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let errors = fields
            .keys()
            .map(|k| (k.clone(), FieldError::default()))
            .collect();
        Self {
            fields,
            errors,
            ..Self::default()
        }
    }

    /// Declare a rule for `field`. Rules run in declaration order.
    pub fn rule(mut self, field: &str, rule: Rule) -> Self {
        self.rules.entry(field.to_owned()).or_default().push(rule);
        self
    }

    /// Clear all errors whenever a field changes.
    pub fn autoclear(mut self, enabled: bool) -> Self {
        self.autoclear = enabled;
        self
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Update a field value.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.fields.insert(field.to_owned(), value.into());
        self.errors.entry(field.to_owned()).or_default();
        if self.autoclear {
            self.reset();
        }
    }

    pub fn errors(&self) -> &IndexMap<String, FieldError> {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn any_error(&self) -> bool {
        self.any_error
    }

    /// Clear every field's error state.
    pub fn reset(&mut self) {
        for error in self.errors.values_mut() {
            *error = FieldError::default();
        }
        self.any_error = false;
    }

    /// Run every rule of every ruled field concurrently.
    ///
    /// Fields without rules are skipped. Fails with the full error map if
    /// any rule failed.
    pub async fn validate(&mut self) -> Result<(), ValidationErrors> {
        self.reset();

        let checks = self
            .fields
            .iter()
            .filter_map(|(name, value)| self.rules.get(name).map(|rules| (name, value, rules)))
            .flat_map(|(name, value, rules)| {
                rules.iter().map(move |rule| async move {
                    let passed = rule.check(value).await;
                    (name.clone(), rule.kind.clone(), rule.message.clone(), passed)
                })
            });
        let results = join_all(checks).await;

        for (field, kind, message, passed) in results {
            if passed {
                continue;
            }
            debug!(field = %field, rule = %kind, "validation rule failed");
            self.any_error = true;
            self.errors.entry(field).or_default().record(&kind, &message);
        }

        if self.any_error {
            Err(ValidationErrors {
                fields: self.errors.clone(),
            })
        } else {
            Ok(())
        }
    }
}
