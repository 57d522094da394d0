use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::common::CollaboratorId;
use crate::model::mongodb::MongoCollection;

/// Core collaborator data, as stored in the database.
///
/// A collaborator is eligible for nomination in every category unless they
/// have explicit `category_collaborators` links, in which case they are
/// eligible only in the linked categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorCore {
    pub full_name: String,
    /// Portrait shown on the voting and presentation screens.
    pub avatar_url: String,
    /// Job title shown under the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Alternative name used on the lottery screen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lottery_name: Option<String>,
    /// Catchphrase shouted by the lottery screen on reveal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lottery_shout: Option<String>,
}

/// A collaborator from the database, with their unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    #[serde(rename = "_id")]
    pub id: CollaboratorId,
    #[serde(flatten)]
    pub collaborator: CollaboratorCore,
}

impl Deref for Collaborator {
    type Target = CollaboratorCore;

    fn deref(&self) -> &Self::Target {
        &self.collaborator
    }
}

impl DerefMut for Collaborator {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.collaborator
    }
}

impl MongoCollection for Collaborator {
    const NAME: &'static str = "collaborators";
}
