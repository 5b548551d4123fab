// ── Activity aggregation ──
//
// Turns the flat activity feed into day buckets for display. Within a
// day, non-image events keep their feed order and image uploads are
// folded into one entry per uploader, appended after the other events.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, TimeZone};
use hivefriends_api::{ActivityImage, ActivityItem};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;

/// One displayed entry inside a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedEntry {
    /// Any non-image event, as received.
    Item(ActivityItem),
    /// Every image one user uploaded that day, in feed order.
    Images {
        uploader: String,
        images: Vec<ActivityImage>,
    },
}

impl FeedEntry {
    pub fn images(&self) -> &[ActivityImage] {
        match self {
            Self::Images { images, .. } => images,
            Self::Item(_) => &[],
        }
    }
}

/// Events of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    /// Zero-padded `MM/DD/YYYY`.
    pub day: String,
    #[serde(skip)]
    pub date: NaiveDate,
    pub entries: Vec<FeedEntry>,
}

/// Calendar day of a Unix timestamp (seconds) in `tz`.
pub fn local_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<NaiveDate, CoreError> {
    timestamp
        .checked_mul(1000)
        .and_then(DateTime::from_timestamp_millis)
        .map(|utc| utc.with_timezone(tz).date_naive())
        .ok_or(CoreError::InvalidTimestamp { timestamp })
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Bucket `items` by local day, newest day first.
pub fn group_by_day<Tz: TimeZone>(
    items: &[ActivityItem],
    tz: &Tz,
) -> Result<Vec<DayGroup>, CoreError> {
    let mut buckets: IndexMap<NaiveDate, Vec<&ActivityItem>> = IndexMap::new();
    for item in items {
        let date = local_date(item.timestamp(), tz)?;
        buckets.entry(date).or_default().push(item);
    }

    let mut days: Vec<DayGroup> = buckets
        .into_iter()
        .map(|(date, bucket)| DayGroup {
            day: day_key(date),
            date,
            entries: consolidate(bucket),
        })
        .collect();

    days.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(days)
}

fn consolidate(bucket: Vec<&ActivityItem>) -> Vec<FeedEntry> {
    let mut entries = Vec::with_capacity(bucket.len());
    let mut uploads: IndexMap<&str, Vec<ActivityImage>> = IndexMap::new();

    for item in bucket {
        match item {
            ActivityItem::Image(image) => uploads
                .entry(image.image.uploader.as_str())
                .or_default()
                .push(image.clone()),
            other => entries.push(FeedEntry::Item(other.clone())),
        }
    }

    entries.extend(uploads.into_iter().map(|(uploader, images)| FeedEntry::Images {
        uploader: uploader.to_owned(),
        images,
    }));
    entries
}

// ── Feed state ───────────────────────────────────────────────────────

/// Last successfully fetched feed, raw and grouped.
#[derive(Debug, Default)]
pub struct ActivityFeed {
    raw: RwLock<Arc<Vec<ActivityItem>>>,
    days: RwLock<Arc<Vec<DayGroup>>>,
}

impl ActivityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feed. Grouping happens first, so a failure leaves the
    /// previous data in place.
    pub fn replace<Tz: TimeZone>(&self, items: Vec<ActivityItem>, tz: &Tz) -> Result<(), CoreError> {
        let days = group_by_day(&items, tz)?;
        *self.raw.write().expect("activity lock poisoned") = Arc::new(items);
        *self.days.write().expect("activity lock poisoned") = Arc::new(days);
        Ok(())
    }

    pub fn raw(&self) -> Arc<Vec<ActivityItem>> {
        self.raw.read().expect("activity lock poisoned").clone()
    }

    pub fn days(&self) -> Arc<Vec<DayGroup>> {
        self.days.read().expect("activity lock poisoned").clone()
    }

    pub fn clear(&self) {
        *self.raw.write().expect("activity lock poisoned") = Arc::default();
        *self.days.write().expect("activity lock poisoned") = Arc::default();
    }
}
