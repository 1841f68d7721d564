use std::fmt::{self, Display};

/// The identifier of a wildfire event.
///
/// Ids are handed out in increasing order starting at 1, so a valid id is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u32);

impl EventId {
    /// The id given to the first event created in a run.
    pub const FIRST: EventId = EventId(1);

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        self.0
            .checked_add(1)
            .map(EventId)
            .expect("more than u32::MAX wildfire events")
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        Display::fmt(&self.0, f)
    }
}

/// Per point bookkeeping while a sweep is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClusterState {
    Unmarked,
    Labeled(EventId),
}

/// The event each detection was assigned to.
///
/// Indexed by the position of the detection in the collection that was clustered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(Vec<EventId>);

impl Labels {
    pub(crate) fn new(ids: Vec<EventId>) -> Self {
        Labels(ids)
    }

    /// The number of labeled points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The event of the point at `index`.
    pub fn get(&self, index: usize) -> Option<EventId> {
        self.0.get(index).copied()
    }

    /// Iterate over `(point index, event)` pairs in point order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, EventId)> + '_ {
        self.0.iter().copied().enumerate()
    }

    pub fn as_slice(&self) -> &[EventId] {
        &self.0
    }

    /// The number of distinct events.
    ///
    /// Ids are contiguous from [EventId::FIRST], so this is also the largest id.
    pub fn num_events(&self) -> usize {
        self.0.iter().map(|id| id.get()).max().unwrap_or(0) as usize
    }

    /// Are the points at these indexes part of the same event?
    pub fn same_event(&self, left: usize, right: usize) -> bool {
        match (self.get(left), self.get(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }

    /// Group point indexes by event, ordered by event id. Indexes in a group are ascending.
    pub fn members(&self) -> Vec<(EventId, Vec<usize>)> {
        let mut groups: Vec<Vec<usize>> = vec![vec![]; self.num_events()];
        for (index, id) in self.iter() {
            groups[id.get() as usize - 1].push(index);
        }

        groups
            .into_iter()
            .enumerate()
            .map(|(i, members)| (EventId(i as u32 + 1), members))
            .collect()
    }
}
