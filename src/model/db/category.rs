use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::common::CategoryId;
use crate::model::mongodb::MongoCollection;

/// Core award category data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCore {
    /// Display name, e.g. "Best Bug Hunter".
    pub name: String,
    /// Longer description shown on the voting page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Emoji shown next to the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// An award category from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    #[serde(flatten)]
    pub category: CategoryCore,
}

impl Deref for Category {
    type Target = CategoryCore;

    fn deref(&self) -> &Self::Target {
        &self.category
    }
}

impl DerefMut for Category {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.category
    }
}

impl MongoCollection for Category {
    const NAME: &'static str = "categories";
}
