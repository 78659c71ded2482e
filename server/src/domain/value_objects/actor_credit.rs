//! ActorCredit value object
//!
//! One entry in a Series' `actors` list, as returned by the external
//! credits endpoint.

use serde::{Deserialize, Serialize};

/// A single cast credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCredit {
    pub name: String,
    pub profile: Option<String>,
    pub role: Option<String>,
}

impl ActorCredit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile: None,
            role: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role;
        self
    }
}
