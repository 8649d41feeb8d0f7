use crate::tree::interval::{Event, IntervalIndex};

/// Facade over the interval index: at most one index, created by the first
/// add and dropped by `clear`.
#[derive(Debug, Default)]
pub struct Calendar {
    index: Option<IntervalIndex>,
}

impl Calendar {
    pub fn new() -> Self {
        Self { index: None }
    }

    /// Drops every stored event. A no-op on an empty calendar.
    pub fn clear(&mut self) {
        self.index = None;
    }

    /// Stores `event`. Re-adding an identical (name, start, finish) event
    /// is a silent no-op. Degenerate intervals (start >= finish) are
    /// accepted but can never match a query.
    pub fn add(&mut self, event: Event) {
        match &mut self.index {
            Some(index) => {
                index.insert(event);
            }
            None => self.index = Some(IntervalIndex::new(event)),
        }
    }

    /// Every event whose interval contains `t`, ordered ascending by event
    /// name. Order among equal names is unspecified.
    pub fn query(&self, t: i64) -> Vec<&Event> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        let mut hits = index.query(t);
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.index.as_ref().map_or(0, IntervalIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
