use serde::{Deserialize, Serialize};

use crate::model::db::VoterCore;

/// A voter as submitted by the admin client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSpec {
    pub employee_code: String,
    pub full_name: String,
}

impl From<VoterSpec> for VoterCore {
    fn from(spec: VoterSpec) -> Self {
        // Normalises the employee code.
        VoterCore::new(&spec.employee_code, spec.full_name)
    }
}

/// The login request body. The employee code is the whole identity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub employee_code: String,
}
