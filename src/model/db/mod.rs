//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g. entity
//! ids live in the `_id` field and datetimes use MongoDB's own format.

mod category;
pub use category::{Category, CategoryCore};

mod collaborator;
pub use collaborator::{Collaborator, CollaboratorCore};

mod eligibility;
pub use eligibility::CategoryCollaborator;

mod nomination;
pub use nomination::Nomination;

mod voter;
pub use voter::{normalise_code, Voter, VoterCore};
