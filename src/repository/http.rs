use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use crate::domain::dog::Dog;
use crate::domain::location::Location;
use crate::domain::types::DogId;
use crate::dto::api::{
    DogSearchQuery, LocationSearchQuery, LocationSearchResponse, LoginRequest, MatchResponse,
    SearchResponse,
};
use crate::models::config::ClientConfig;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DogReader, LocationReader, MatchWriter, SessionWriter};

/// reqwest implementation of the search service contract.
///
/// The session credential is an HTTP-only cookie set by `/auth/login`, kept in
/// the client's cookie store and sent with every later request.
#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(base_url: &str, timeout: Duration) -> RepositoryResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn from_config(config: &ClientConfig) -> RepositoryResult<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Adds a scheme when missing and drops trailing slashes.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn ensure_success(response: Response, operation: &'static str) -> RepositoryResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(RepositoryError::Unauthorized),
        status => Err(RepositoryError::Status {
            operation,
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl SessionWriter for HttpRepository {
    async fn login(&self, request: &LoginRequest) -> RepositoryResult<bool> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;

        log::debug!("Login responded with {}", response.status());
        Ok(response.status().is_success())
    }

    async fn logout(&self) -> RepositoryResult<()> {
        let response = self.client.post(self.url("/auth/logout")).send().await?;
        ensure_success(response, "Logout")?;
        Ok(())
    }
}

#[async_trait]
impl DogReader for HttpRepository {
    async fn list_breeds(&self) -> RepositoryResult<Vec<String>> {
        let response = self.client.get(self.url("/dogs/breeds")).send().await?;
        let breeds = ensure_success(response, "Fetching breeds")?.json().await?;
        Ok(breeds)
    }

    async fn search_dogs(&self, query: &DogSearchQuery) -> RepositoryResult<SearchResponse> {
        let query_string = query.to_query_string()?;
        let url = format!("{}?{}", self.url("/dogs/search"), query_string);
        log::debug!("Searching dogs: {url}");

        let response = self.client.get(url).send().await?;
        let result = ensure_success(response, "Searching dogs")?.json().await?;
        Ok(result)
    }

    async fn fetch_dogs(&self, ids: &[DogId]) -> RepositoryResult<Vec<Dog>> {
        let response = self
            .client
            .post(self.url("/dogs"))
            .json(ids)
            .send()
            .await?;
        let dogs = ensure_success(response, "Fetching dogs")?.json().await?;
        Ok(dogs)
    }
}

#[async_trait]
impl MatchWriter for HttpRepository {
    async fn generate_match(&self, ids: &[DogId]) -> RepositoryResult<MatchResponse> {
        let response = self
            .client
            .post(self.url("/dogs/match"))
            .json(ids)
            .send()
            .await?;
        let matched = ensure_success(response, "Generating match")?.json().await?;
        Ok(matched)
    }
}

#[async_trait]
impl LocationReader for HttpRepository {
    async fn search_locations(
        &self,
        query: &LocationSearchQuery,
    ) -> RepositoryResult<Vec<Location>> {
        let response = self
            .client
            .post(self.url("/locations/search"))
            .json(query)
            .send()
            .await?;
        let page: LocationSearchResponse =
            ensure_success(response, "Searching locations")?.json().await?;
        Ok(page.into_locations())
    }
}
