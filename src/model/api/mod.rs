//! Request/response types for the HTTP API.

mod category;
pub use category::CategorySpec;

mod collaborator;
pub use collaborator::CollaboratorSpec;

mod voter;
pub use voter::{LoginRequest, VoterSpec};

mod nomination;
pub use nomination::NominationSpec;
