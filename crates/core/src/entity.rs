//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Entities that belong to exactly one owner.
///
/// Every repository lookup filters on the owner, so an entity of another owner
/// is indistinguishable from a missing one.
pub trait Owned: Entity {
    type Owner: Copy + Eq + core::fmt::Debug;

    fn owner_id(&self) -> Self::Owner;
}
