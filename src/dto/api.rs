//! Request and response payloads of the dog search service.

use serde::{Deserialize, Serialize};

use crate::domain::location::{BoundingBox, Location};
use crate::domain::types::DogId;

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
}

/// Query string of `GET /dogs/search`.
///
/// Sequences serialize as repeated keys (`breeds=A&breeds=B`).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DogSearchQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breeds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zip_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u32>,
    pub size: usize,
    /// Result offset. Absent for the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub sort: String,
}

impl DogSearchQuery {
    pub fn to_query_string(&self) -> Result<String, serde_html_form::ser::Error> {
        serde_html_form::to_string(self)
    }
}

/// Response of `GET /dogs/search`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub result_ids: Vec<DogId>,
    pub total: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// Response of `POST /dogs/match`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub matched: DogId,
}

/// Body of `POST /locations/search`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchQuery {
    pub geo_bounding_box: BoundingBox,
    pub size: usize,
}

/// Response of `POST /locations/search`.
///
/// The service wraps results in a page object; a bare list is accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationSearchResponse {
    /// `{results, total}`; the total is not needed and is ignored.
    Page { results: Vec<Location> },
    List(Vec<Location>),
}

impl LocationSearchResponse {
    pub fn into_locations(self) -> Vec<Location> {
        match self {
            LocationSearchResponse::Page { results } => results,
            LocationSearchResponse::List(results) => results,
        }
    }
}
