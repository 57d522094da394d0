use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{CategoryId, CollaboratorId, VoterId};
use crate::model::mongodb::MongoCollection;

/// A voter's current pick of one collaborator within one category.
///
/// The invariant the whole system rests on: at most one nomination document
/// per `(voter_id, category_id)` pair. A unique index on that pair plus
/// upsert writes enforce it; see the nomination endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub voter_id: VoterId,
    pub category_id: CategoryId,
    pub collaborator_id: CollaboratorId,
    /// When the voter last changed this pick.
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl MongoCollection for Nomination {
    const NAME: &'static str = "nominations";
}

impl Nomination {
    pub fn new(voter_id: VoterId, category_id: CategoryId, collaborator_id: CollaboratorId) -> Self {
        Self {
            voter_id,
            category_id,
            collaborator_id,
            updated_at: Utc::now(),
        }
    }
}
