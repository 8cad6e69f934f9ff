//! Wires the filter, search and favorites components together the way the
//! search page uses them.

use std::sync::Arc;

use crate::domain::dog::Dog;
use crate::domain::types::DogId;
use crate::query::SearchParams;
use crate::repository::{DogReader, LocationReader, MatchWriter, SessionWriter};
use crate::services::ServiceResult;
use crate::services::favorites::FavoritesEngine;
use crate::services::filters::{FilterManager, NearbyToggle};
use crate::services::geolocation::{Geolocator, NearbyResolver, NearbySettings};
use crate::services::notifications::{Notification, Notifier};
use crate::services::search::{SearchEngine, SearchOutcome};
use crate::services::session::Session;

pub struct SearchPage<R: ?Sized, G: ?Sized> {
    session: Session<R>,
    filters: FilterManager<R, G>,
    search: SearchEngine<R>,
    favorites: FavoritesEngine<R>,
    notifier: Arc<dyn Notifier>,
}

impl<R, G> SearchPage<R, G>
where
    R: SessionWriter + DogReader + MatchWriter + LocationReader + ?Sized,
    G: Geolocator + ?Sized,
{
    /// Builds the page components without touching the network.
    pub fn new(
        repo: Arc<R>,
        geolocator: Arc<G>,
        notifier: Arc<dyn Notifier>,
        settings: NearbySettings,
    ) -> Self {
        let resolver = NearbyResolver::new(repo.clone(), geolocator, settings);
        Self {
            session: Session::new(repo.clone()),
            filters: FilterManager::new(repo.clone(), resolver),
            search: SearchEngine::new(repo.clone()),
            favorites: FavoritesEngine::new(repo, notifier.clone()),
            notifier,
        }
    }

    /// Loads the breed list and the first page of results.
    pub async fn open(&self) {
        // Suggestions stay empty when breeds cannot be loaded.
        let _ = self.filters.load_breeds().await;
        self.report(self.search.search(None, 1).await);
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn filters(&self) -> &FilterManager<R, G> {
        &self.filters
    }

    pub fn search(&self) -> &SearchEngine<R> {
        &self.search
    }

    pub fn favorites(&self) -> &FavoritesEngine<R> {
        &self.favorites
    }

    /// Searches the first page with the current filter selection.
    pub async fn apply_filters(&self) -> SearchOutcome {
        let params = self.filters.build_query_parameters();
        self.run(params).await
    }

    /// Clears every filter and searches the first page with defaults.
    pub async fn reset_filters(&self) -> SearchOutcome {
        self.filters.reset();
        let outcome = self.search.reset_search().await;
        self.report(outcome)
    }

    /// Toggles nearby mode and re-runs the search when the location
    /// constraint changed.
    pub async fn toggle_nearby(&self) -> NearbyToggle {
        let outcome = self.filters.toggle_nearby().await;
        match &outcome {
            NearbyToggle::Activated(codes) => {
                self.notifier.notify(Notification::success(format!(
                    "Searching in {} nearby areas",
                    codes.len()
                )));
                self.apply_filters().await;
            }
            NearbyToggle::Deactivated => {
                self.apply_filters().await;
            }
            NearbyToggle::Failed(err) => {
                self.notifier.notify(Notification::error(err.user_message()));
            }
            NearbyToggle::Ignored | NearbyToggle::Superseded => {}
        }
        outcome
    }

    pub async fn change_page(&self, page: usize) -> SearchOutcome {
        let outcome = self.search.change_page(page).await;
        self.report(outcome)
    }

    /// Toggles a favorite, naming the dog when it is on the current page.
    pub fn favorite_dog(&self, id: &DogId) -> bool {
        let name = self
            .search
            .state()
            .dogs
            .into_iter()
            .find(|dog| &dog.id == id)
            .map(|dog| dog.name);
        self.favorites.toggle_favorite(id, name.as_deref())
    }

    pub async fn generate_match(&self) -> ServiceResult<Dog> {
        self.favorites.generate_match().await
    }

    pub fn close_match(&self) {
        self.favorites.close_match_dialog();
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.notifier
            .notify(Notification::success("Logged out successfully"));
    }

    async fn run(&self, params: SearchParams) -> SearchOutcome {
        let outcome = self.search.search(Some(params), 1).await;
        self.report(outcome)
    }

    fn report(&self, outcome: SearchOutcome) -> SearchOutcome {
        if let SearchOutcome::Failed(_) = &outcome {
            self.notifier.notify(Notification::error("Search failed"));
        }
        outcome
    }
}
