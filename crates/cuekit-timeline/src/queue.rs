//! Run buffer for one subject and the drift tests that decide when a run ends.

use cuekit_core::BoundingBox;

use crate::detection::DetectionItem;

/// Ordered buffer of detections belonging to one ongoing run.
///
/// Items are appended in temporal order. [`reduce_all`](Self::reduce_all)
/// drains the buffer into a single representative item.
#[derive(Debug, Clone, Default)]
pub struct TimelineQueue {
    items: Vec<DetectionItem>,
}

impl TimelineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to the run.
    pub fn push(&mut self, item: DetectionItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&DetectionItem> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&DetectionItem> {
        self.items.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionItem> {
        self.items.iter()
    }

    /// Fold the whole run into one item and leave the queue empty.
    ///
    /// The result spans the first begin to the last end and counts every
    /// buffered item. Confidence and each box dimension are geometric means
    /// over the values present; name and parent name are the first non-empty
    /// ones in run order. Returns `None` on an empty queue.
    pub fn reduce_all(&mut self) -> Option<DetectionItem> {
        let items = std::mem::take(&mut self.items);
        let last_end = items.last()?.end;
        let mut reduced = items.first()?.clone();

        let mean_of = |field: fn(&BoundingBox) -> Option<f64>| {
            geometric_mean(items.iter().map(|item| field(&item.bounding_box)))
        };

        reduced.end = last_end.max(reduced.begin);
        reduced.count = items.len();
        reduced.confidence = geometric_mean(items.iter().map(|item| item.confidence));
        reduced.bounding_box = BoundingBox {
            left: mean_of(|b| b.left),
            top: mean_of(|b| b.top),
            width: mean_of(|b| b.width),
            height: mean_of(|b| b.height),
        };
        reduced.name = items
            .iter()
            .find_map(|item| item.name.clone().filter(|n| !n.is_empty()));
        reduced.parent_name = items
            .iter()
            .find_map(|item| item.parent_name.clone().filter(|n| !n.is_empty()));
        Some(reduced)
    }
}

impl Extend<DetectionItem> for TimelineQueue {
    fn extend<T: IntoIterator<Item = DetectionItem>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

/// Geometric mean of the present values, `None` if there are none.
///
/// Computed as the product of `v^(1/n)` so large runs do not overflow.
pub fn geometric_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    let power = 1.0 / present.len() as f64;
    Some(present.iter().fold(1.0, |acc, v| acc * v.powf(power)))
}

/// Whether the gap between `prev` ending and `cur` beginning exceeds
/// `cur`'s time threshold. Missing items never exceed.
pub fn time_drift_exceeds(prev: Option<&DetectionItem>, cur: Option<&DetectionItem>) -> bool {
    match (prev, cur) {
        (Some(prev), Some(cur)) => (cur.begin - prev.end).abs() as f64 > cur.time_drift_threshold,
        _ => false,
    }
}

/// Whether the centers of `prev` and `cur` are further apart than `cur`'s
/// position threshold. Missing items or unresolved centers never exceed.
pub fn position_drift_exceeds(prev: Option<&DetectionItem>, cur: Option<&DetectionItem>) -> bool {
    match (prev, cur) {
        (Some(prev), Some(cur)) => prev
            .bounding_box
            .center_distance(&cur.bounding_box)
            .is_some_and(|distance| distance > cur.position_drift_threshold),
        _ => false,
    }
}
