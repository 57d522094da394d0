use serde::{Deserialize, Serialize};

use crate::model::db::CategoryCore;

/// An award category as submitted by the admin client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl From<CategorySpec> for CategoryCore {
    fn from(spec: CategorySpec) -> Self {
        Self {
            name: spec.name,
            description: spec.description,
            emoji: spec.emoji,
        }
    }
}
