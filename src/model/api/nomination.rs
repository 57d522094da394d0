use serde::{Deserialize, Serialize};

use crate::model::common::CollaboratorId;

/// The body of a nomination request; the voter and category come from the
/// request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationSpec {
    pub collaborator_id: CollaboratorId,
}
