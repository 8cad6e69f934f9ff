//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::dog::Dog;
use crate::domain::location::Location;
use crate::domain::types::DogId;
use crate::dto::api::{
    DogSearchQuery, LocationSearchQuery, LoginRequest, MatchResponse, SearchResponse,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DogReader, LocationReader, MatchWriter, SessionWriter};

mock! {
    pub Repository {}

    #[async_trait]
    impl SessionWriter for Repository {
        async fn login(&self, request: &LoginRequest) -> RepositoryResult<bool>;
        async fn logout(&self) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl DogReader for Repository {
        async fn list_breeds(&self) -> RepositoryResult<Vec<String>>;
        async fn search_dogs(&self, query: &DogSearchQuery) -> RepositoryResult<SearchResponse>;
        async fn fetch_dogs(&self, ids: &[DogId]) -> RepositoryResult<Vec<Dog>>;
    }

    #[async_trait]
    impl MatchWriter for Repository {
        async fn generate_match(&self, ids: &[DogId]) -> RepositoryResult<MatchResponse>;
    }

    #[async_trait]
    impl LocationReader for Repository {
        async fn search_locations(
            &self,
            query: &LocationSearchQuery,
        ) -> RepositoryResult<Vec<Location>>;
    }
}
