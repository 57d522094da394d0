use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::common::VoterId;
use crate::model::mongodb::MongoCollection;

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    /// The employee code, upper-cased. Possession of this string is the
    /// voter's entire identity proof; there is no password.
    pub employee_code: String,
    pub full_name: String,
}

impl VoterCore {
    /// Create a new voter, normalising the employee code so lookups are
    /// case-insensitive.
    pub fn new(employee_code: &str, full_name: String) -> Self {
        Self {
            employee_code: normalise_code(employee_code),
            full_name,
        }
    }
}

/// The canonical form of an employee code, as stored and looked up.
pub fn normalise_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A voter from the database, with their unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: VoterId,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}

impl MongoCollection for Voter {
    const NAME: &'static str = "voters";
}
