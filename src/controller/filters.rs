//! Filter state and its transition function
//!
//! All list inputs (search box, country and type dropdowns, scholarships
//! checkbox, page buttons) are expressed as [`FilterAction`]s and folded into
//! [`FilterState`] by [`FilterState::reduce`]. Two rules live here and only
//! here:
//!
//! - changing any filter moves back to page 1
//! - clearing resets every filter and the page in one transition

use crate::api::CatalogQuery;

/// User-controlled list inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// 1-based
    pub page: u32,
    pub search: String,
    pub country: String,
    pub university_type: String,
    pub scholarships_only: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            country: String::new(),
            university_type: String::new(),
            scholarships_only: false,
        }
    }
}

/// One user input against the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetSearch(String),
    SetCountry(String),
    SetType(String),
    SetScholarshipsOnly(bool),
    SetPage(u32),
    Clear,
}

/// Result of applying an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: FilterState,
    /// Whether the catalog must be fetched again
    pub refetch: bool,
}

impl FilterState {
    /// Next state for `action`.
    ///
    /// `Clear` always asks for a refetch (it is an explicit reload request);
    /// every other action refetches only when the state actually changed.
    pub fn reduce(&self, action: FilterAction) -> Transition {
        let next = match action {
            FilterAction::SetSearch(search) => Self {
                search,
                page: 1,
                ..self.clone()
            },
            FilterAction::SetCountry(country) => Self {
                country,
                page: 1,
                ..self.clone()
            },
            FilterAction::SetType(university_type) => Self {
                university_type,
                page: 1,
                ..self.clone()
            },
            FilterAction::SetScholarshipsOnly(scholarships_only) => Self {
                scholarships_only,
                page: 1,
                ..self.clone()
            },
            FilterAction::SetPage(page) => Self {
                page: page.max(1),
                ..self.clone()
            },
            FilterAction::Clear => {
                return Transition {
                    state: Self::default(),
                    refetch: true,
                }
            }
        };

        let refetch = next != *self;
        Transition {
            state: next,
            refetch,
        }
    }

    /// Whether any filter (not the page) is narrowing the list
    pub fn is_filtered(&self) -> bool {
        !self.search.trim().is_empty()
            || !self.country.is_empty()
            || !self.university_type.is_empty()
            || self.scholarships_only
    }

    /// Request parameters. Empty strings and `false` mean "not filtering"
    /// and are left out entirely.
    pub fn to_query(&self, page_size: u32) -> CatalogQuery {
        fn active(s: &str) -> Option<String> {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }

        CatalogQuery {
            page: self.page,
            page_size,
            search: active(&self.search),
            country: active(&self.country),
            university_type: active(&self.university_type),
            scholarships: self.scholarships_only.then_some(true),
        }
    }
}
