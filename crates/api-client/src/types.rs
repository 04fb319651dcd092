//! Wire types for the platform API.

use serde::{Deserialize, Serialize};

/// Body of `POST /spa-check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaCheckRequest {
    pub files: Vec<String>,
    /// Contents of the root `index.html`.
    pub index: String,
}

/// Response of `POST /spa-check`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpaCheckResponse {
    #[serde(rename = "isSPA")]
    pub is_spa: bool,
}
