use serde::{Deserialize, Serialize};

/// Path of the organization listing, relative to the API host.
pub const ORGANIZATIONS_PATH: &str = "/organizations";

/// Prefix under which the server mounts the API routes.
pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

impl Default for HelloResponse {
    fn default() -> Self {
        Self {
            message: "Hello World".into(),
        }
    }
}
