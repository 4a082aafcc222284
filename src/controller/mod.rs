//! View-model controllers
//!
//! Each controller owns the state one screen reads and the requests that
//! change it. None of them render; see [`crate::render`] for that.

pub mod dashboard;
pub mod deadline;
pub mod filters;
pub mod form;
pub mod list;
pub mod pagination;

pub use dashboard::DashboardController;
pub use deadline::DeadlineStatus;
pub use filters::{FilterAction, FilterState, Transition};
pub use form::{FormController, FormMode, SubmitError, SubmitOutcome, UniversityForm};
pub use list::{ActionError, ListController, Scope, ViewMode};
pub use pagination::PageItem;
