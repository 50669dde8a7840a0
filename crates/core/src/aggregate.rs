//! Aggregate root trait and optimistic concurrency expectations.

/// Aggregate root marker + minimal interface.
///
/// Aggregates in this workspace are persisted through explicit repositories.
/// The identifier is assigned by the repository on first save, so it is absent
/// on freshly built aggregates.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier, or `None` before the first save.
    fn id(&self) -> Option<&Self::Id>;

    /// Persisted revision of the aggregate's state.
    ///
    /// `0` means "never saved". Repositories bump it on every successful write.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation: the stored revision a write was based on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(pub u64);

impl ExpectedVersion {
    /// The revision `aggregate` was loaded at.
    pub fn of<A: AggregateRoot>(aggregate: &A) -> Self {
        Self(aggregate.version())
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }
}
