//! Breed, age, sort and nearby selections of the search page.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::domain::sort::SortSpec;
use crate::query::{FilterSelection, SearchParams, build_search_params};
use crate::repository::{DogReader, LocationReader};
use crate::repository::errors::RepositoryResult;
use crate::services::geolocation::{GeolocationError, Geolocator, NearbyResolver};

/// Progress of the "dogs near me" filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NearbyState {
    #[default]
    Off,
    Resolving,
    /// Active with the resolved zip codes; never empty.
    On(Vec<String>),
}

impl NearbyState {
    pub fn zip_codes(&self) -> &[String] {
        match self {
            NearbyState::On(codes) => codes,
            _ => &[],
        }
    }
}

/// Result of [`FilterManager::toggle_nearby`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NearbyToggle {
    /// Nearby mode is now on with these zip codes.
    Activated(Vec<String>),
    /// Nearby mode was switched off; the search should drop the location.
    Deactivated,
    /// Resolution failed and nearby mode is off again.
    Failed(GeolocationError),
    /// A resolution was already in flight; nothing was started.
    Ignored,
    /// Filters were reset while resolving; the result was discarded.
    Superseded,
}

/// Read-only copy of the filter state for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSnapshot {
    pub selected_breeds: Vec<String>,
    pub breed_search: String,
    pub filtered_breeds: Vec<String>,
    pub age_min: String,
    pub age_max: String,
    pub sort: SortSpec,
    pub nearby: NearbyState,
    pub has_active_filters: bool,
}

#[derive(Debug, Default)]
struct FilterState {
    selected_breeds: Vec<String>,
    breed_search: String,
    age_min: String,
    age_max: String,
    sort: SortSpec,
    nearby: NearbyState,
    /// Bumped whenever a nearby resolution starts or is cancelled.
    nearby_epoch: u64,
}

impl FilterState {
    fn selection(&self) -> FilterSelection<'_> {
        FilterSelection {
            breeds: &self.selected_breeds,
            zip_codes: self.nearby.zip_codes(),
            age_min: &self.age_min,
            age_max: &self.age_max,
            sort: self.sort,
        }
    }

    fn has_active_filters(&self) -> bool {
        !self.selected_breeds.is_empty()
            || !self.age_min.is_empty()
            || !self.age_max.is_empty()
            || !self.sort.is_default()
            || matches!(self.nearby, NearbyState::On(_))
    }
}

/// Breeds containing `search` (case-insensitively) that are not selected yet,
/// in the order of `available`.
pub fn filter_breeds(available: &[String], search: &str, selected: &[String]) -> Vec<String> {
    let needle = search.to_lowercase();
    available
        .iter()
        .filter(|breed| breed.to_lowercase().contains(&needle) && !selected.contains(breed))
        .cloned()
        .collect()
}

/// Returns nearby mode to `Off` if its resolution is dropped before
/// finishing. A newer resolution or a reset is left alone.
struct ResolvingGuard<'a> {
    state: &'a Mutex<FilterState>,
    epoch: u64,
    armed: bool,
}

impl ResolvingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.nearby_epoch == self.epoch && state.nearby == NearbyState::Resolving {
            log::debug!("Nearby resolution abandoned");
            state.nearby = NearbyState::Off;
        }
    }
}

pub struct FilterManager<R: ?Sized, G: ?Sized> {
    repo: Arc<R>,
    resolver: NearbyResolver<R, G>,
    breeds: OnceLock<Vec<String>>,
    state: Mutex<FilterState>,
}

impl<R, G> FilterManager<R, G>
where
    R: DogReader + LocationReader + ?Sized,
    G: Geolocator + ?Sized,
{
    pub fn new(repo: Arc<R>, resolver: NearbyResolver<R, G>) -> Self {
        Self {
            repo,
            resolver,
            breeds: OnceLock::new(),
            state: Mutex::new(FilterState::default()),
        }
    }

    /// Fetches and sorts the breed list. Later calls reuse the loaded list.
    pub async fn load_breeds(&self) -> RepositoryResult<()> {
        if self.breeds.get().is_some() {
            return Ok(());
        }

        let mut breeds = self.repo.list_breeds().await.map_err(|err| {
            log::error!("Failed to fetch breeds: {err}");
            err
        })?;
        breeds.sort();
        log::debug!("Loaded {} breeds", breeds.len());

        // A concurrent load may have won; both lists come from the same source.
        let _ = self.breeds.set(breeds);
        Ok(())
    }

    pub fn available_breeds(&self) -> &[String] {
        self.breeds.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn filtered_breeds(&self) -> Vec<String> {
        let state = self.state.lock();
        filter_breeds(
            self.available_breeds(),
            &state.breed_search,
            &state.selected_breeds,
        )
    }

    pub fn selected_breeds(&self) -> Vec<String> {
        self.state.lock().selected_breeds.clone()
    }

    pub fn set_breed_search_text(&self, text: impl Into<String>) {
        self.state.lock().breed_search = text.into();
    }

    /// Selects `name` unless already selected. Always clears the search text.
    pub fn add_breed(&self, name: &str) {
        let mut state = self.state.lock();
        if !state.selected_breeds.iter().any(|b| b == name) {
            state.selected_breeds.push(name.to_string());
        }
        state.breed_search.clear();
    }

    pub fn remove_breed(&self, name: &str) {
        self.state.lock().selected_breeds.retain(|b| b != name);
    }

    /// Stores the raw text; it is parsed when query parameters are built.
    pub fn set_age_min(&self, text: impl Into<String>) {
        self.state.lock().age_min = text.into();
    }

    pub fn set_age_max(&self, text: impl Into<String>) {
        self.state.lock().age_max = text.into();
    }

    pub fn set_sort(&self, sort: SortSpec) {
        self.state.lock().sort = sort;
    }

    pub fn nearby(&self) -> NearbyState {
        self.state.lock().nearby.clone()
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.lock().has_active_filters()
    }

    pub fn build_query_parameters(&self) -> SearchParams {
        build_search_params(self.state.lock().selection())
    }

    /// Clears every selection and returns nearby mode to `Off`, abandoning
    /// any resolution in flight.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let epoch = state.nearby_epoch + 1;
        *state = FilterState {
            nearby_epoch: epoch,
            ..FilterState::default()
        };
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        let state = self.state.lock();
        FilterSnapshot {
            selected_breeds: state.selected_breeds.clone(),
            breed_search: state.breed_search.clone(),
            filtered_breeds: filter_breeds(
                self.available_breeds(),
                &state.breed_search,
                &state.selected_breeds,
            ),
            age_min: state.age_min.clone(),
            age_max: state.age_max.clone(),
            sort: state.sort,
            nearby: state.nearby.clone(),
            has_active_filters: state.has_active_filters(),
        }
    }

    /// Advances the nearby state machine.
    ///
    /// `Off` resolves zip codes around the device; `On` switches off at once;
    /// a toggle while `Resolving` is ignored.
    pub async fn toggle_nearby(&self) -> NearbyToggle {
        let epoch = {
            let mut state = self.state.lock();
            match state.nearby {
                NearbyState::Resolving => return NearbyToggle::Ignored,
                NearbyState::On(_) => {
                    state.nearby = NearbyState::Off;
                    return NearbyToggle::Deactivated;
                }
                NearbyState::Off => {
                    state.nearby = NearbyState::Resolving;
                    state.nearby_epoch += 1;
                    state.nearby_epoch
                }
            }
        };

        let guard = ResolvingGuard {
            state: &self.state,
            epoch,
            armed: true,
        };
        let resolved = self.resolver.resolve().await;
        guard.disarm();

        let mut state = self.state.lock();
        if state.nearby_epoch != epoch || state.nearby != NearbyState::Resolving {
            log::debug!("Discarding nearby resolution superseded by a reset");
            return NearbyToggle::Superseded;
        }

        match resolved {
            Ok(codes) if !codes.is_empty() => {
                state.nearby = NearbyState::On(codes.clone());
                NearbyToggle::Activated(codes)
            }
            Ok(_) => {
                state.nearby = NearbyState::Off;
                NearbyToggle::Failed(GeolocationError::NoNearbyLocations)
            }
            Err(err) => {
                log::error!("Nearby lookup failed: {err}");
                state.nearby = NearbyState::Off;
                NearbyToggle::Failed(err)
            }
        }
    }
}
