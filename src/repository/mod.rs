use async_trait::async_trait;

use crate::{
    domain::{dog::Dog, location::Location, types::DogId},
    dto::api::{DogSearchQuery, LocationSearchQuery, LoginRequest, MatchResponse, SearchResponse},
    repository::errors::RepositoryResult,
};

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use http::HttpRepository;

#[async_trait]
pub trait SessionWriter: Send + Sync {
    /// Returns `false` when the service rejects the credentials.
    async fn login(&self, request: &LoginRequest) -> RepositoryResult<bool>;
    async fn logout(&self) -> RepositoryResult<()>;
}

#[async_trait]
pub trait DogReader: Send + Sync {
    async fn list_breeds(&self) -> RepositoryResult<Vec<String>>;
    async fn search_dogs(&self, query: &DogSearchQuery) -> RepositoryResult<SearchResponse>;
    /// Order of the returned records is not guaranteed to follow `ids`.
    async fn fetch_dogs(&self, ids: &[DogId]) -> RepositoryResult<Vec<Dog>>;
}

#[async_trait]
pub trait MatchWriter: Send + Sync {
    async fn generate_match(&self, ids: &[DogId]) -> RepositoryResult<MatchResponse>;
}

#[async_trait]
pub trait LocationReader: Send + Sync {
    async fn search_locations(&self, query: &LocationSearchQuery)
    -> RepositoryResult<Vec<Location>>;
}
