//! Paged dog results for the current filters.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::domain::dog::{Dog, order_by_ids};
use crate::query::{PAGE_SIZE, SearchParams, total_pages};
use crate::repository::DogReader;
use crate::repository::errors::{RepositoryError, RepositoryResult};

/// Error shown when a search request fails.
pub const SEARCH_FAILED_MESSAGE: &str =
    "Failed to search dogs. Please check your connection and try again.";

/// Committed search results and request status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Current page of dogs in the order the search returned them.
    pub dogs: Vec<Dog>,
    pub total: usize,
    pub current_page: usize,
    pub loading: bool,
    /// Empty when the last search succeeded.
    pub error: String,
    pub has_searched: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            dogs: Vec::new(),
            total: 0,
            current_page: 1,
            loading: false,
            error: String::new(),
            has_searched: false,
        }
    }
}

impl SearchState {
    pub fn total_pages(&self) -> usize {
        total_pages(self.total, PAGE_SIZE)
    }
}

/// Signals emitted after results are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// A page change finished; the results view should scroll to the top.
    PageReady { page: usize },
}

/// Result of a single [`SearchEngine::search`] call.
#[derive(Debug)]
pub enum SearchOutcome {
    Committed,
    /// A newer search was issued while this one was in flight.
    Superseded,
    /// The request failed; the previous results were kept.
    Failed(RepositoryError),
}

impl SearchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SearchOutcome::Committed)
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: SearchState,
    last_params: SearchParams,
}

/// Clears the loading flag if a search is dropped before it commits, unless a
/// newer search has been issued since.
struct LoadingGuard<'a> {
    inner: &'a Mutex<Inner>,
    issued: &'a AtomicU64,
    ticket: u64,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.issued.load(Ordering::SeqCst) == self.ticket {
            log::debug!("Search #{} abandoned", self.ticket);
            self.inner.lock().state.loading = false;
        }
    }
}

pub struct SearchEngine<R: ?Sized> {
    repo: Arc<R>,
    inner: Mutex<Inner>,
    /// Sequence number of the most recently issued request.
    issued: AtomicU64,
    events: broadcast::Sender<SearchEvent>,
}

impl<R> SearchEngine<R>
where
    R: DogReader + ?Sized,
{
    /// Creates an engine without running a search.
    pub fn new(repo: Arc<R>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            repo,
            inner: Mutex::new(Inner::default()),
            issued: AtomicU64::new(0),
            events,
        }
    }

    /// Creates an engine and loads the first page with default parameters.
    pub async fn start(repo: Arc<R>) -> Self {
        let engine = Self::new(repo);
        if let SearchOutcome::Failed(err) = engine.search(None, 1).await {
            log::warn!("Initial search failed: {err}");
        }
        engine
    }

    pub fn state(&self) -> SearchState {
        self.inner.lock().state.clone()
    }

    pub fn last_params(&self) -> SearchParams {
        self.inner.lock().last_params.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    pub fn clear_error(&self) {
        self.inner.lock().state.error.clear();
    }

    /// Runs a search for `page`.
    ///
    /// Without `params` the last used parameters are reused. Only the most
    /// recently issued call may commit; earlier ones return `Superseded`.
    /// When the reported total no longer reaches `page`, the last existing
    /// page is fetched instead.
    pub async fn search(&self, params: Option<SearchParams>, page: usize) -> SearchOutcome {
        let mut page = page.max(1);
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let effective = {
            let mut inner = self.inner.lock();
            inner.state.loading = true;
            inner.state.error.clear();
            params
                .clone()
                .unwrap_or_else(|| inner.last_params.clone())
        };

        let guard = LoadingGuard {
            inner: &self.inner,
            issued: &self.issued,
            ticket,
            armed: true,
        };

        let mut fetched = self.fetch_page(&effective, page).await;
        if let Ok((_, total)) = &fetched {
            let pages = total_pages(*total, PAGE_SIZE);
            if pages > 0 && page > pages && self.issued.load(Ordering::SeqCst) == ticket {
                log::debug!("Page {page} is past the last page {pages}, fetching that instead");
                page = pages;
                fetched = self.fetch_page(&effective, page).await;
            }
        }
        guard.disarm();

        if self.issued.load(Ordering::SeqCst) != ticket {
            log::debug!("Discarding results of superseded search #{ticket}");
            return SearchOutcome::Superseded;
        }

        let mut inner = self.inner.lock();
        inner.state.loading = false;

        match fetched {
            Ok((dogs, total)) => {
                let pages = total_pages(total, PAGE_SIZE);
                inner.state.dogs = dogs;
                inner.state.total = total;
                inner.state.current_page = if pages == 0 { page } else { page.min(pages) };
                inner.state.has_searched = true;
                if let Some(params) = params {
                    inner.last_params = params;
                }
                SearchOutcome::Committed
            }
            Err(err) => {
                log::error!("Search error: {err}");
                inner.state.error = SEARCH_FAILED_MESSAGE.to_string();
                SearchOutcome::Failed(err)
            }
        }
    }

    /// Loads `page` with the last used parameters and emits
    /// [`SearchEvent::PageReady`] with the committed page.
    pub async fn change_page(&self, page: usize) -> SearchOutcome {
        let page = {
            let inner = self.inner.lock();
            let pages = inner.state.total_pages();
            if inner.state.has_searched && pages > 0 {
                page.clamp(1, pages)
            } else {
                page.max(1)
            }
        };

        let outcome = self.search(None, page).await;
        if outcome.is_committed() {
            let page = self.inner.lock().state.current_page;
            // No subscribers is fine.
            let _ = self.events.send(SearchEvent::PageReady { page });
        }
        outcome
    }

    /// Searches the first page with default parameters.
    pub async fn reset_search(&self) -> SearchOutcome {
        self.search(Some(SearchParams::default()), 1).await
    }

    async fn fetch_page(
        &self,
        params: &SearchParams,
        page: usize,
    ) -> RepositoryResult<(Vec<Dog>, usize)> {
        let query = params.to_query(page);
        let response = self.repo.search_dogs(&query).await?;

        if response.result_ids.is_empty() {
            return Ok((Vec::new(), response.total));
        }

        let fetched = self.repo.fetch_dogs(&response.result_ids).await?;
        if fetched.len() != response.result_ids.len() {
            log::warn!(
                "Bulk fetch returned {} of {} dogs",
                fetched.len(),
                response.result_ids.len()
            );
        }

        Ok((order_by_ids(&response.result_ids, fetched), response.total))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::domain::types::DogId;
    use crate::dto::api::{DogSearchQuery, SearchResponse};
    use crate::repository::mock::MockRepository;

    fn dog(id: &str) -> Dog {
        Dog {
            id: DogId::from(id),
            img: String::new(),
            name: format!("Dog {id}"),
            age: 2,
            zip_code: "10001".to_string(),
            breed: "Pug".to_string(),
        }
    }

    fn ids(raw: &[&str]) -> Vec<DogId> {
        raw.iter().map(|id| DogId::from(*id)).collect()
    }

    #[tokio::test]
    async fn start_runs_default_search() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs()
            .withf(|q| q.sort == "breed:asc" && q.size == 25 && q.from.is_none())
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["a"]),
                    total: 1,
                    ..SearchResponse::default()
                })
            });
        repo.expect_fetch_dogs().returning(|_| Ok(vec![dog("a")]));

        let engine = SearchEngine::start(Arc::new(repo)).await;
        let state = engine.state();

        assert!(state.has_searched);
        assert!(!state.loading);
        assert_eq!(state.dogs.len(), 1);
        assert_eq!(state.current_page, 1);
    }

    #[tokio::test]
    async fn results_follow_search_order() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs().returning(|_| {
            Ok(SearchResponse {
                result_ids: ids(&["b", "a", "c"]),
                total: 3,
                ..SearchResponse::default()
            })
        });
        repo.expect_fetch_dogs()
            .withf(|requested| requested.len() == 3)
            .returning(|_| Ok(vec![dog("a"), dog("b"), dog("c")]));

        let engine = SearchEngine::new(Arc::new(repo));
        engine.search(None, 1).await;

        let names: Vec<_> = engine.state().dogs.into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["Dog b", "Dog a", "Dog c"]);
    }

    #[tokio::test]
    async fn empty_result_skips_bulk_fetch() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs()
            .returning(|_| Ok(SearchResponse::default()));
        repo.expect_fetch_dogs().never();

        let engine = SearchEngine::new(Arc::new(repo));
        let outcome = engine.search(Some(SearchParams::default().breeds(["Nope"])), 4).await;

        assert!(outcome.is_committed());
        let state = engine.state();
        assert!(state.dogs.is_empty());
        assert!(state.has_searched);
        assert_eq!(state.total_pages(), 0);
        assert_eq!(state.current_page, 4);
    }

    #[tokio::test]
    async fn failure_keeps_previous_results() {
        let mut repo = MockRepository::new();
        let mut calls = 0;
        repo.expect_search_dogs().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(SearchResponse {
                    result_ids: ids(&["a"]),
                    total: 57,
                    ..SearchResponse::default()
                })
            } else {
                Err(RepositoryError::ConnectionError("offline".into()))
            }
        });
        repo.expect_fetch_dogs().returning(|_| Ok(vec![dog("a")]));

        let engine = SearchEngine::new(Arc::new(repo));
        engine.search(None, 1).await;
        let outcome = engine.change_page(2).await;

        assert!(matches!(outcome, SearchOutcome::Failed(_)));
        let state = engine.state();
        assert_eq!(state.dogs.len(), 1);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.error, SEARCH_FAILED_MESSAGE);
        assert!(!state.loading);

        engine.clear_error();
        assert!(engine.state().error.is_empty());
    }

    #[tokio::test]
    async fn page_change_reuses_last_params_and_signals_after_commit() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs()
            .withf(|q| q.breeds == ["Pug"] && q.from.is_none())
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["a"]),
                    total: 57,
                    ..SearchResponse::default()
                })
            });
        repo.expect_search_dogs()
            .withf(|q| q.breeds == ["Pug"] && q.from.as_deref() == Some("50"))
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["z"]),
                    total: 57,
                    ..SearchResponse::default()
                })
            });
        repo.expect_fetch_dogs()
            .returning(|requested| Ok(requested.iter().map(|id| dog(id.as_str())).collect()));

        let engine = SearchEngine::new(Arc::new(repo));
        let mut events = engine.subscribe();

        engine
            .search(Some(SearchParams::default().breeds(["Pug"])), 1)
            .await;
        assert!(events.try_recv().is_err());

        assert!(engine.change_page(3).await.is_committed());

        assert_eq!(events.try_recv().unwrap(), SearchEvent::PageReady { page: 3 });
        let state = engine.state();
        assert_eq!(state.total_pages(), 3);
        assert_eq!(state.current_page, 3);
        assert_eq!(state.dogs[0].id.as_str(), "z");
    }

    #[tokio::test]
    async fn page_change_is_clamped_to_known_pages() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs()
            .withf(|q| q.from.is_none())
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["a"]),
                    total: 30,
                    ..SearchResponse::default()
                })
            });
        repo.expect_search_dogs()
            .withf(|q| q.from.as_deref() == Some("25"))
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["b"]),
                    total: 30,
                    ..SearchResponse::default()
                })
            });
        repo.expect_fetch_dogs()
            .returning(|requested| Ok(requested.iter().map(|id| dog(id.as_str())).collect()));

        let engine = SearchEngine::new(Arc::new(repo));
        engine.search(None, 1).await;
        engine.change_page(9).await;

        assert_eq!(engine.state().current_page, 2);
    }

    #[tokio::test]
    async fn shrunken_total_loads_last_existing_page() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs()
            .withf(|q| q.from.is_none())
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["a"]),
                    total: 100,
                    ..SearchResponse::default()
                })
            });
        repo.expect_search_dogs()
            .withf(|q| q.from.as_deref() == Some("75"))
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: Vec::new(),
                    total: 30,
                    ..SearchResponse::default()
                })
            });
        repo.expect_search_dogs()
            .withf(|q| q.from.as_deref() == Some("25"))
            .times(1)
            .returning(|_| {
                Ok(SearchResponse {
                    result_ids: ids(&["b"]),
                    total: 30,
                    ..SearchResponse::default()
                })
            });
        repo.expect_fetch_dogs()
            .returning(|requested| Ok(requested.iter().map(|id| dog(id.as_str())).collect()));

        let engine = SearchEngine::new(Arc::new(repo));
        let mut events = engine.subscribe();
        engine.search(None, 1).await;

        assert!(engine.change_page(4).await.is_committed());

        let state = engine.state();
        assert_eq!(state.total_pages(), 2);
        assert_eq!(state.current_page, 2);
        assert_eq!(state.dogs[0].id.as_str(), "b");
        assert_eq!(events.try_recv().unwrap(), SearchEvent::PageReady { page: 2 });
    }

    #[tokio::test]
    async fn reset_search_uses_default_parameters() {
        let mut repo = MockRepository::new();
        repo.expect_search_dogs()
            .withf(|q| q.breeds == ["Pug"])
            .times(1)
            .returning(|_| Ok(SearchResponse::default()));
        repo.expect_search_dogs()
            .withf(|q| q.breeds.is_empty() && q.sort == "breed:asc" && q.from.is_none())
            .times(1)
            .returning(|_| Ok(SearchResponse::default()));

        let engine = SearchEngine::new(Arc::new(repo));
        engine
            .search(Some(SearchParams::default().breeds(["Pug"])), 1)
            .await;

        assert!(engine.reset_search().await.is_committed());
        assert_eq!(engine.last_params(), SearchParams::default());
    }

    /// Answers each page only after its gate is opened.
    struct GatedRepository {
        gates: HashMap<Option<String>, Arc<Notify>>,
    }

    impl GatedRepository {
        fn new(offsets: &[Option<&str>]) -> Self {
            let gates = offsets
                .iter()
                .map(|offset| (offset.map(str::to_string), Arc::new(Notify::new())))
                .collect();
            Self { gates }
        }

        fn open(&self, offset: Option<&str>) {
            self.gates[&offset.map(str::to_string)].notify_one();
        }
    }

    #[async_trait]
    impl DogReader for GatedRepository {
        async fn list_breeds(&self) -> RepositoryResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn search_dogs(&self, query: &DogSearchQuery) -> RepositoryResult<SearchResponse> {
            let gate = self.gates[&query.from].clone();
            gate.notified().await;
            let id = format!("page-{}", query.from.as_deref().unwrap_or("0"));
            Ok(SearchResponse {
                result_ids: vec![DogId::from(id)],
                total: 100,
                ..SearchResponse::default()
            })
        }

        async fn fetch_dogs(&self, ids: &[DogId]) -> RepositoryResult<Vec<Dog>> {
            Ok(ids.iter().map(|id| dog(id.as_str())).collect())
        }
    }

    async fn race(
        release_newer_first: bool,
    ) -> (SearchEngine<GatedRepository>, SearchOutcome, SearchOutcome) {
        let repo = Arc::new(GatedRepository::new(&[Some("25"), Some("50")]));
        let engine = SearchEngine::new(repo.clone());

        let release = async {
            if release_newer_first {
                repo.open(Some("50"));
                tokio::task::yield_now().await;
                repo.open(Some("25"));
            } else {
                repo.open(Some("25"));
                tokio::task::yield_now().await;
                repo.open(Some("50"));
            }
        };
        let (older, newer, ()) =
            tokio::join!(engine.search(None, 2), engine.search(None, 3), release);

        (engine, older, newer)
    }

    #[tokio::test]
    async fn stale_response_arriving_last_is_discarded() {
        let (engine, older, newer) = race(true).await;

        assert!(matches!(older, SearchOutcome::Superseded));
        assert!(newer.is_committed());
        let state = engine.state();
        assert_eq!(state.current_page, 3);
        assert_eq!(state.dogs[0].id.as_str(), "page-50");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn stale_response_arriving_first_is_discarded() {
        let (engine, older, newer) = race(false).await;

        assert!(matches!(older, SearchOutcome::Superseded));
        assert!(newer.is_committed());
        let state = engine.state();
        assert_eq!(state.current_page, 3);
        assert_eq!(state.dogs[0].id.as_str(), "page-50");
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_search_clears_loading() {
        let repo = Arc::new(GatedRepository::new(&[Some("25")]));
        let engine = SearchEngine::new(repo.clone());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), engine.search(None, 2)).await;

        assert!(abandoned.is_err());
        let state = engine.state();
        assert!(!state.loading);
        assert!(!state.has_searched);
    }
}
