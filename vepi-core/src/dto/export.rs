//! Export DTOs for the model read-back endpoints

use serde::{Deserialize, Serialize};

use crate::domain::export::HierarchyMember;

/// One page of `GET /models/{modelId}/intersections`
///
/// The first row of `data` repeats the column headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionsPage {
    #[serde(default)]
    pub data: Vec<Vec<serde_json::Value>>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default)]
    pub headers: Vec<String>,
    /// Absolute URL of the following page, absent on the last page
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Body of `GET /models/{modelId}/hierarchy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyResponse {
    #[serde(default)]
    pub data: Vec<HierarchyMember>,
}
