//! Shared primitive types.

/// Our category ids are integers.
pub type CategoryId = u32;
/// Our collaborator ids are integers.
pub type CollaboratorId = u32;
/// Our voter ids are integers.
pub type VoterId = u32;
