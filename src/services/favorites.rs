//! Favorite dogs and match generation.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::dog::Dog;
use crate::domain::types::DogId;
use crate::repository::{DogReader, MatchWriter};
use crate::services::notifications::{Notification, Notifier};
use crate::services::{ServiceError, ServiceResult};

pub const NO_FAVORITES_MESSAGE: &str = "Please add some dogs to your favorites first!";
pub const MATCH_FAILED_MESSAGE: &str = "Failed to generate match. Please try again.";

/// Status of match generation and the match display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchState {
    pub generating: bool,
    pub matched_dog: Option<Dog>,
    pub dialog_open: bool,
}

/// Clears the generating flag on drop, including when the match future is
/// abandoned mid-request.
struct GeneratingGuard<'a> {
    matching: &'a Mutex<MatchState>,
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.matching.lock().generating = false;
    }
}

pub struct FavoritesEngine<R: ?Sized> {
    repo: Arc<R>,
    notifier: Arc<dyn Notifier>,
    favorites: Mutex<HashSet<DogId>>,
    matching: Mutex<MatchState>,
}

impl<R> FavoritesEngine<R>
where
    R: DogReader + MatchWriter + ?Sized,
{
    pub fn new(repo: Arc<R>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            favorites: Mutex::new(HashSet::new()),
            matching: Mutex::new(MatchState::default()),
        }
    }

    /// Flips membership of `id` and returns whether it is now a favorite.
    ///
    /// With a display name, a notification names the dog that was added or
    /// removed.
    pub fn toggle_favorite(&self, id: &DogId, display_name: Option<&str>) -> bool {
        let added = {
            let mut favorites = self.favorites.lock();
            if favorites.remove(id) {
                false
            } else {
                favorites.insert(id.clone());
                true
            }
        };

        if let Some(name) = display_name {
            let message = if added {
                format!("Added {name} to favorites")
            } else {
                format!("Removed {name} from favorites")
            };
            self.notifier.notify(Notification::success(message));
        }

        added
    }

    /// Returns `true` if `id` was not a favorite before.
    pub fn add_favorite(&self, id: &DogId) -> bool {
        self.favorites.lock().insert(id.clone())
    }

    /// Returns `true` if `id` was a favorite before.
    pub fn remove_favorite(&self, id: &DogId) -> bool {
        self.favorites.lock().remove(id)
    }

    pub fn clear_favorites(&self) {
        self.favorites.lock().clear();
        self.notifier
            .notify(Notification::success("Cleared all favorites"));
    }

    pub fn is_favorite(&self, id: &DogId) -> bool {
        self.favorites.lock().contains(id)
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.lock().len()
    }

    /// Favorite identifiers in a stable (sorted) order.
    pub fn favorites(&self) -> Vec<DogId> {
        let mut ids: Vec<_> = self.favorites.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn match_state(&self) -> MatchState {
        self.matching.lock().clone()
    }

    /// Asks the service to pick one dog out of the favorites and opens the
    /// match display with its full record.
    ///
    /// Fails without any request when there are no favorites, and returns
    /// [`ServiceError::Busy`] while another generation is in flight.
    pub async fn generate_match(&self) -> ServiceResult<Dog> {
        let candidates = self.favorites();
        if candidates.is_empty() {
            self.notifier.notify(Notification::error(NO_FAVORITES_MESSAGE));
            return Err(ServiceError::Precondition(NO_FAVORITES_MESSAGE.to_string()));
        }

        let guard = {
            let mut matching = self.matching.lock();
            if matching.generating {
                log::debug!("Ignoring match request while one is in flight");
                return Err(ServiceError::Busy);
            }
            matching.generating = true;
            GeneratingGuard {
                matching: &self.matching,
            }
        };
        self.notifier
            .notify(Notification::info("Finding your perfect match..."));

        let result = self.resolve_match(&candidates).await;
        drop(guard);

        let mut matching = self.matching.lock();
        match result {
            Ok(dog) => {
                log::info!("Matched with {} ({})", dog.name, dog.id);
                matching.matched_dog = Some(dog.clone());
                matching.dialog_open = true;
                Ok(dog)
            }
            Err(err) => {
                log::error!("Match error: {err}");
                self.notifier.notify(Notification::error(MATCH_FAILED_MESSAGE));
                Err(err)
            }
        }
    }

    async fn resolve_match(&self, candidates: &[DogId]) -> ServiceResult<Dog> {
        let response = self.repo.generate_match(candidates).await?;
        let matched = response.matched;
        if !candidates.contains(&matched) {
            return Err(ServiceError::Internal(format!(
                "match {matched} is not one of the submitted favorites"
            )));
        }

        self.repo
            .fetch_dogs(std::slice::from_ref(&matched))
            .await?
            .into_iter()
            .find(|dog| dog.id == matched)
            .ok_or(ServiceError::NotFound)
    }

    /// Closes the match display. Favorites are left untouched.
    pub fn close_match_dialog(&self) {
        let mut matching = self.matching.lock();
        matching.dialog_open = false;
        matching.matched_dog = None;
    }
}
