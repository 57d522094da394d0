use serde::{Deserialize, Serialize};

use crate::model::common::{CategoryId, CollaboratorId};
use crate::model::mongodb::MongoCollection;

/// A single eligibility link. A collaborator with no links at all may be
/// nominated in every category; a collaborator with at least one link may be
/// nominated only in the linked categories.
///
/// Links are addressed by their composite key (a unique index covers the
/// pair); the document's auto-generated `_id` is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCollaborator {
    pub category_id: CategoryId,
    pub collaborator_id: CollaboratorId,
}

impl MongoCollection for CategoryCollaborator {
    const NAME: &'static str = "category_collaborators";
}
