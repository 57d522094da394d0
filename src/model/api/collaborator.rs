use serde::{Deserialize, Serialize};

use crate::model::db::CollaboratorCore;

/// A collaborator as submitted by the admin client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorSpec {
    pub full_name: String,
    pub avatar_url: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub lottery_name: Option<String>,
    #[serde(default)]
    pub lottery_shout: Option<String>,
}

impl From<CollaboratorSpec> for CollaboratorCore {
    fn from(spec: CollaboratorSpec) -> Self {
        Self {
            full_name: spec.full_name,
            avatar_url: spec.avatar_url,
            role: spec.role,
            lottery_name: spec.lottery_name,
            lottery_shout: spec.lottery_shout,
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CollaboratorSpec {
        pub fn example(full_name: &str) -> Self {
            Self {
                full_name: full_name.to_string(),
                avatar_url: format!("https://avatars.example.com/{full_name}.png"),
                role: None,
                lottery_name: None,
                lottery_shout: None,
            }
        }
    }
}
