// ── Toast queue ──
//
// User-visible notifications, newest first. Errors linger longer than
// other kinds. A toast past its timeout is dropped the next time the
// queue is read or added to; `drain` hands over whatever is still queued.

use std::collections::VecDeque;
use std::sync::RwLock;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

const ERROR_TIMEOUT: Duration = Duration::from_millis(6000);
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub timeout: Duration,
    #[serde(skip)]
    created: Instant,
}

impl Toast {
    pub fn new(text: impl Into<String>, kind: ToastKind) -> Self {
        let timeout = match kind {
            ToastKind::Error => ERROR_TIMEOUT,
            ToastKind::Info | ToastKind::Success => DEFAULT_TIMEOUT,
        };
        Self {
            text: text.into(),
            kind,
            timeout,
            created: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created.elapsed() >= self.timeout
    }
}

fn prune(items: &mut VecDeque<Toast>) {
    items.retain(|t| !t.is_expired());
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    items: RwLock<VecDeque<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, text: impl Into<String>, kind: ToastKind) {
        let toast = Toast::new(text, kind);
        match kind {
            ToastKind::Error => warn!(text = %toast.text, "error toast"),
            _ => debug!(text = %toast.text, %kind, "toast"),
        }
        let mut items = self.items.write().expect("toast lock poisoned");
        prune(&mut items);
        items.push_front(toast);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.add(text, ToastKind::Error);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.add(text, ToastKind::Success);
    }

    /// Remove by position in the current `snapshot`.
    pub fn remove(&self, index: usize) -> Option<Toast> {
        let mut items = self.items.write().expect("toast lock poisoned");
        prune(&mut items);
        items.remove(index)
    }

    pub fn clear(&self) {
        self.items.write().expect("toast lock poisoned").clear();
    }

    /// Live toasts, newest first.
    pub fn snapshot(&self) -> Vec<Toast> {
        let mut items = self.items.write().expect("toast lock poisoned");
        prune(&mut items);
        items.iter().cloned().collect()
    }

    /// Take every toast, oldest first, leaving the queue empty.
    pub fn drain(&self) -> Vec<Toast> {
        let mut items = self.items.write().expect("toast lock poisoned");
        items.drain(..).rev().collect()
    }

    pub fn len(&self) -> usize {
        let mut items = self.items.write().expect("toast lock poisoned");
        prune(&mut items);
        items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
