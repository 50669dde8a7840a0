//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and never change after construction; to
/// "modify" one, build a new value. Invoice product lines are the canonical
/// example in this workspace: two lines with the same name, quantity and unit
/// price are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
