//! Conversion of filter selections into the search endpoint's query contract.

use crate::domain::sort::SortSpec;
use crate::dto::api::DogSearchQuery;

/// Number of dogs per result page, shared with the search service.
pub const PAGE_SIZE: usize = 25;

/// Filter parameters of a dog search, independent of the requested page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub breeds: Vec<String>,
    pub zip_codes: Vec<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub sort: SortSpec,
    pub size: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            breeds: Vec::new(),
            zip_codes: Vec::new(),
            age_min: None,
            age_max: None,
            sort: SortSpec::default(),
            size: PAGE_SIZE,
        }
    }
}

impl SearchParams {
    pub fn breeds<I, S>(mut self, breeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breeds = breeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn zip_codes<I, S>(mut self, zip_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zip_codes = zip_codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn age_range(mut self, age_min: Option<u32>, age_max: Option<u32>) -> Self {
        self.age_min = age_min;
        self.age_max = age_max;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Renders the wire query for the given 1-based page.
    pub fn to_query(&self, page: usize) -> DogSearchQuery {
        DogSearchQuery {
            breeds: self.breeds.clone(),
            zip_codes: self.zip_codes.clone(),
            age_min: self.age_min,
            age_max: self.age_max,
            size: self.size,
            from: offset_for_page(page, self.size).map(|offset| offset.to_string()),
            sort: self.sort.to_string(),
        }
    }
}

/// Result offset for a 1-based page; `None` for the first page.
pub fn offset_for_page(page: usize, page_size: usize) -> Option<usize> {
    (page > 1).then(|| (page - 1) * page_size)
}

/// Number of pages needed to show `total` results.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Parses a raw age bound as typed by the user.
///
/// Blank or non-numeric input means "no bound".
pub fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Borrowed view of the filter fields that shape a search.
#[derive(Debug, Clone, Copy)]
pub struct FilterSelection<'a> {
    pub breeds: &'a [String],
    pub zip_codes: &'a [String],
    pub age_min: &'a str,
    pub age_max: &'a str,
    pub sort: SortSpec,
}

/// Builds search parameters from the current selection.
pub fn build_search_params(selection: FilterSelection<'_>) -> SearchParams {
    SearchParams::default()
        .breeds(selection.breeds.iter().cloned())
        .zip_codes(selection.zip_codes.iter().cloned())
        .age_range(parse_age(selection.age_min), parse_age(selection.age_max))
        .sort(selection.sort)
}
