use super::AnomalyEvent;
use std::collections::VecDeque;

/// Bounded, newest-first store of ingested anomalies with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyBuffer {
    events: VecDeque<AnomalyEvent>,
}

impl AnomalyBuffer {
    /// Maximum number of retained events; the oldest is evicted beyond this.
    pub const CAPACITY: usize = 50;

    pub fn new() -> Self { Self { events: VecDeque::with_capacity(Self::CAPACITY + 1) } }

    /// Prepends `event` unless its id is already present.
    ///
    /// # Returns
    /// `true` if the event was ingested.
    pub fn push(&mut self, event: AnomalyEvent) -> bool {
        if self.contains(event.id()) {
            return false;
        }
        self.events.push_front(event);
        self.events.truncate(Self::CAPACITY);
        true
    }

    /// Marks the event with `id` as reviewed.
    ///
    /// # Returns
    /// `true` if such an event is buffered.
    pub fn flag(&mut self, id: &str) -> bool {
        match self.events.iter_mut().find(|e| e.id() == id) {
            Some(event) => {
                event.mark_reviewed();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool { self.events.iter().any(|e| e.id() == id) }

    pub fn get(&self, id: &str) -> Option<&AnomalyEvent> { self.events.iter().find(|e| e.id() == id) }

    /// Iterates from the newest to the oldest event.
    pub fn iter(&self) -> impl Iterator<Item = &AnomalyEvent> { self.events.iter() }

    pub fn len(&self) -> usize { self.events.len() }

    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    /// Floor of the mean severity weight, 0 when empty, at most 100.
    #[allow(clippy::cast_possible_truncation)]
    pub fn score(&self) -> u32 {
        if self.events.is_empty() {
            return 0;
        }
        let total: u64 = self.events.iter().map(|e| u64::from(e.severity().weight())).sum();
        (total / self.events.len() as u64).min(100) as u32
    }
}
