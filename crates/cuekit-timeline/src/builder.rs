//! Turning a stream of detections into timelines.
//!
//! Consecutive usable detections of one subject are buffered while they stay
//! close in time and position; a drift in either flushes the run as one
//! reduced timeline item.

use std::collections::BTreeMap;

use cuekit_core::Result;
use tracing::{debug, trace};

use crate::detection::DetectionItem;
use crate::face_name::FaceNameResolver;
use crate::options::ItemOptions;
use crate::queue::{position_drift_exceeds, time_drift_exceeds, TimelineQueue};
use crate::record::RawDetection;
use crate::timeseries::Timeseries;

/// Incremental run detection for one subject.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    queue: TimelineQueue,
    timelines: Vec<DetectionItem>,
    skipped: usize,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next detection. Returns `false` if it was not usable.
    pub fn push(&mut self, item: DetectionItem) -> bool {
        if !item.can_use() {
            trace!(kind = %item.kind, begin = item.begin, "Skipping unusable detection");
            self.skipped += 1;
            return false;
        }

        let last = self.queue.last();
        if time_drift_exceeds(last, Some(&item)) || position_drift_exceeds(last, Some(&item)) {
            self.flush();
        }
        self.queue.push(item);
        true
    }

    /// Number of detections rejected by [`push`](Self::push).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Timelines completed so far, not counting the open run.
    pub fn timelines(&self) -> &[DetectionItem] {
        &self.timelines
    }

    /// Close the open run and return every timeline in temporal order.
    pub fn finish(mut self) -> Vec<DetectionItem> {
        self.flush();
        debug!(
            timelines = self.timelines.len(),
            skipped = self.skipped,
            "Timeline build complete"
        );
        self.timelines
    }

    fn flush(&mut self) {
        let pending = self.queue.len();
        if let Some(reduced) = self.queue.reduce_all() {
            trace!(
                begin = reduced.begin,
                end = reduced.end,
                count = pending,
                "Flushed run"
            );
            self.timelines.push(reduced);
        }
    }
}

/// Build timelines for one subject from raw records in temporal order.
///
/// A record that cannot be typed fails the whole batch.
pub fn build_timelines(
    records: &[RawDetection],
    options: &ItemOptions,
    resolver: &dyn FaceNameResolver,
) -> Result<Vec<DetectionItem>> {
    let mut builder = TimelineBuilder::new();
    for record in records {
        builder.push(DetectionItem::from_record(record, options, resolver)?);
    }
    Ok(builder.finish())
}

/// Build timelines for every subject in a mixed batch, keyed by item name.
///
/// Records are grouped by the name of their typed item (a label, a
/// celebrity, a person index) and each group is clustered independently.
/// Unusable or nameless items are dropped.
pub fn build_subject_timelines(
    records: &[RawDetection],
    options: &ItemOptions,
    resolver: &dyn FaceNameResolver,
) -> Result<BTreeMap<String, Vec<DetectionItem>>> {
    Ok(group_by_subject(records, options, resolver)?
        .into_iter()
        .map(|(name, items)| (name, cluster(items)))
        .collect())
}

/// Build the timeseries of every subject in a mixed batch.
///
/// Grouping matches [`build_subject_timelines`]; each series carries the
/// appearance of its subject's timelines and `duration_ms` of media.
pub fn build_subject_timeseries(
    records: &[RawDetection],
    options: &ItemOptions,
    resolver: &dyn FaceNameResolver,
    duration_ms: i64,
) -> Result<BTreeMap<String, Timeseries>> {
    let mut series = BTreeMap::new();
    for (name, items) in group_by_subject(records, options, resolver)? {
        let timelines = cluster(items.clone());
        if let Some(ts) = Timeseries::from_detections(name.as_str(), &items, &timelines, duration_ms) {
            series.insert(name, ts);
        }
    }
    Ok(series)
}

fn group_by_subject(
    records: &[RawDetection],
    options: &ItemOptions,
    resolver: &dyn FaceNameResolver,
) -> Result<BTreeMap<String, Vec<DetectionItem>>> {
    let mut groups: BTreeMap<String, Vec<DetectionItem>> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        let item = DetectionItem::from_record(record, options, resolver)?;
        match item.name.clone() {
            Some(name) if item.can_use() => groups.entry(name).or_default().push(item),
            _ => dropped += 1,
        }
    }

    debug!(
        subjects = groups.len(),
        dropped,
        records = records.len(),
        "Grouped detections by subject"
    );
    Ok(groups)
}

fn cluster(items: Vec<DetectionItem>) -> Vec<DetectionItem> {
    let mut builder = TimelineBuilder::new();
    for item in items {
        builder.push(item);
    }
    builder.finish()
}

/// Total on-screen time of a set of timelines, in milliseconds.
pub fn appearance_ms(timelines: &[DetectionItem]) -> i64 {
    timelines.iter().map(DetectionItem::duration_ms).sum()
}
