// University list controller
//
// Owns everything the list and detail views read: filters, page, loaded
// universities, loaded applications, view mode and the selected university.
//
// Requests are split into begin/finish halves so overlapping fetches can be
// driven by an outer event loop. Each begin hands out a ticket stamped with a
// sequence number; a finish whose ticket is not the latest is dropped, so a
// slow response to an old filter can never overwrite a newer one. Catalog and
// application fetches are sequenced independently and may finish in either
// order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::api::{
    ApiClient, ApiError, Application, CatalogQuery, Credentials, ListResponse, University,
    UniversityId,
};

use super::filters::{FilterAction, FilterState};
use super::pagination::{self, PageItem};

/// Results per page
pub const DEFAULT_PAGE_SIZE: u32 = 9;

const LOAD_FAILED: &str = "Failed to load universities";
const APPLICATIONS_FAILED: &str = "Failed to load applications";
const DETAIL_FAILED: &str = "Failed to load university details";
const APPLY_FAILED: &str = "Failed to apply. You may have already applied.";
const WITHDRAW_FAILED: &str = "Failed to withdraw application. Please try again.";

/// Card grid or compact rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

/// Which catalog the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Public,
    /// Records owned by the signed-in administrator
    Admin,
}

/// Handle for an outstanding catalog fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTicket {
    seq: u64,
    pub query: CatalogQuery,
    pub scope: Scope,
}

/// Handle for an outstanding application-list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationsTicket {
    seq: u64,
}

/// Why apply/withdraw did not go through
#[derive(Debug)]
pub enum ActionError {
    /// A request for the same university is still outstanding
    Busy(UniversityId),
    /// The server refused or could not be reached
    Failed(ApiError),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy(id) => write!(f, "A request for university {} is already in progress", id),
            Self::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ActionError {}

/// What a withdraw request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Withdrawn,
    /// No loaded application matched; nothing was sent
    NotApplied,
}

/// What a toggle request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied,
    Withdrawn,
}

/// State and orchestration for the university list
pub struct ListController {
    api: ApiClient,
    page_size: u32,
    scope: Scope,
    filters: FilterState,
    view_mode: ViewMode,

    universities: Vec<University>,
    total_count: u64,
    applications: Vec<Application>,
    selected: Option<University>,

    loading: bool,
    error: Option<String>,
    applications_error: Option<String>,
    notice: Option<String>,

    catalog_seq: u64,
    applications_seq: u64,
    busy: HashSet<UniversityId>,
}

impl ListController {
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            scope: Scope::Public,
            filters: FilterState::default(),
            view_mode: ViewMode::default(),
            universities: Vec::new(),
            total_count: 0,
            applications: Vec::new(),
            selected: None,
            loading: false,
            error: None,
            applications_error: None,
            notice: None,
            catalog_seq: 0,
            applications_seq: 0,
            busy: HashSet::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inputs
    // ─────────────────────────────────────────────────────────────────────────

    /// Fold a filter/page input into the state. Returns whether a reload is due.
    pub fn update(&mut self, action: FilterAction) -> bool {
        let transition = self.filters.reduce(action);
        self.filters = transition.state;
        transition.refetch
    }

    /// Switch between public and admin catalogs. Returns whether a reload is due.
    pub fn set_scope(&mut self, scope: Scope) -> bool {
        let changed = self.scope != scope;
        self.scope = scope;
        changed
    }

    /// Apply an input and reload if it changed anything
    pub async fn dispatch(&mut self, creds: &Credentials, action: FilterAction) {
        if self.update(action) {
            self.refresh(creds).await;
        }
    }

    /// Switch catalogs and reload if that changed anything
    pub async fn change_scope(&mut self, creds: &Credentials, scope: Scope) {
        if self.set_scope(scope) {
            self.refresh(creds).await;
        }
    }

    /// Reset every filter and the page, then reload once
    pub async fn clear_filters(&mut self, creds: &Credentials) {
        self.dispatch(creds, FilterAction::Clear).await;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggle();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Reload the catalog page and the application list
    pub async fn refresh(&mut self, creds: &Credentials) {
        let catalog = self.begin_catalog_fetch();
        let applications = creds
            .is_authenticated()
            .then(|| self.begin_applications_fetch());

        let api = self.api.clone();
        let catalog_fut = async {
            match catalog.scope {
                Scope::Public => api.list_universities(creds, &catalog.query).await,
                Scope::Admin => api.list_my_universities(creds, &catalog.query).await,
            }
        };
        tokio::pin!(catalog_fut);

        let Some(ticket) = applications else {
            let result = catalog_fut.await;
            self.finish_catalog_fetch(&catalog, result);
            return;
        };

        // Each half lands as soon as it completes
        let applications_fut = api.my_applications(creds);
        tokio::pin!(applications_fut);
        let (mut catalog_done, mut applications_done) = (false, false);
        while !(catalog_done && applications_done) {
            tokio::select! {
                result = &mut catalog_fut, if !catalog_done => {
                    catalog_done = true;
                    self.finish_catalog_fetch(&catalog, result);
                }
                result = &mut applications_fut, if !applications_done => {
                    applications_done = true;
                    self.finish_applications_fetch(ticket, result);
                }
            }
        }
    }

    /// Start a catalog fetch for the current filters
    pub fn begin_catalog_fetch(&mut self) -> CatalogTicket {
        self.catalog_seq += 1;
        self.loading = true;
        self.error = None;
        CatalogTicket {
            seq: self.catalog_seq,
            query: self.filters.to_query(self.page_size),
            scope: self.scope,
        }
    }

    /// Apply a catalog response. Returns false when the ticket was stale.
    pub fn finish_catalog_fetch(
        &mut self,
        ticket: &CatalogTicket,
        result: Result<ListResponse<University>, ApiError>,
    ) -> bool {
        if ticket.seq != self.catalog_seq {
            tracing::debug!(
                "Dropping stale catalog response (#{} < #{})",
                ticket.seq,
                self.catalog_seq
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(list) => {
                let (items, total) = list.into_parts();
                self.universities = items;
                self.total_count = total;
            }
            Err(e) => {
                tracing::error!("Failed to load universities: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
            }
        }
        true
    }

    pub fn begin_applications_fetch(&mut self) -> ApplicationsTicket {
        self.applications_seq += 1;
        ApplicationsTicket {
            seq: self.applications_seq,
        }
    }

    /// Apply an application-list response. Failures keep the previous list.
    pub fn finish_applications_fetch(
        &mut self,
        ticket: ApplicationsTicket,
        result: Result<Vec<Application>, ApiError>,
    ) -> bool {
        if ticket.seq != self.applications_seq {
            tracing::debug!("Dropping stale applications response");
            return false;
        }
        match result {
            Ok(apps) => self.applications_loaded(apps),
            Err(e) => self.applications_failed(&e),
        }
        true
    }

    fn applications_loaded(&mut self, apps: Vec<Application>) {
        self.applications = apps;
        self.applications_error = None;
    }

    fn applications_failed(&mut self, e: &ApiError) {
        tracing::warn!("Failed to load applications: {}", e);
        self.applications_error = Some(APPLICATIONS_FAILED.to_string());
    }

    /// Reload only the application list. On failure the previous list is
    /// kept and `applications_error` is set.
    pub async fn reload_applications(&mut self, creds: &Credentials) -> Result<(), ApiError> {
        // Nothing else can begin a fetch while we hold `&mut self`
        self.begin_applications_fetch();
        match self.api.my_applications(creds).await {
            Ok(apps) => {
                self.applications_loaded(apps);
                Ok(())
            }
            Err(e) => {
                self.applications_failed(&e);
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Apply / withdraw
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether an apply/withdraw for `id` is outstanding (disable its button)
    pub fn is_busy(&self, id: UniversityId) -> bool {
        self.busy.contains(&id)
    }

    /// Mark `id` as having a request in flight. Refuses a second one.
    pub fn begin_action(&mut self, id: UniversityId) -> Result<(), ActionError> {
        if !self.busy.insert(id) {
            return Err(ActionError::Busy(id));
        }
        Ok(())
    }

    pub fn finish_action(&mut self, id: UniversityId) {
        self.busy.remove(&id);
    }

    /// Apply, then reload applications from the server
    pub async fn apply(&mut self, creds: &Credentials, id: UniversityId) -> Result<(), ActionError> {
        self.begin_action(id)?;
        self.notice = None;

        let result = self.api.apply(creds, id).await;
        let outcome = match result {
            Ok(app) => {
                tracing::info!("Applied to university {} (application {})", id, app.id);
                // A failed reload is kept in applications_error
                let _ = self.reload_applications(creds).await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to apply to university {}: {}", id, e);
                self.notice = Some(APPLY_FAILED.to_string());
                Err(ActionError::Failed(e))
            }
        };

        self.finish_action(id);
        outcome
    }

    /// Withdraw the loaded application for `id`, then reload applications
    pub async fn withdraw(
        &mut self,
        creds: &Credentials,
        id: UniversityId,
    ) -> Result<WithdrawOutcome, ActionError> {
        let Some(application_id) = self.application_for(id).map(|a| a.id) else {
            return Ok(WithdrawOutcome::NotApplied);
        };

        self.begin_action(id)?;
        self.notice = None;

        let outcome = match self.api.withdraw_application(creds, application_id).await {
            Ok(()) => {
                tracing::info!("Withdrew application {} (university {})", application_id, id);
                let _ = self.reload_applications(creds).await;
                Ok(WithdrawOutcome::Withdrawn)
            }
            Err(e) => {
                tracing::warn!("Failed to withdraw application {}: {}", application_id, e);
                self.notice = Some(WITHDRAW_FAILED.to_string());
                Err(ActionError::Failed(e))
            }
        };

        self.finish_action(id);
        outcome
    }

    /// Withdraw if applied, otherwise apply
    pub async fn toggle_application(
        &mut self,
        creds: &Credentials,
        id: UniversityId,
    ) -> Result<ToggleOutcome, ActionError> {
        if self.has_applied(id) {
            self.withdraw(creds, id).await?;
            Ok(ToggleOutcome::Withdrawn)
        } else {
            self.apply(creds, id).await?;
            Ok(ToggleOutcome::Applied)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Detail
    // ─────────────────────────────────────────────────────────────────────────

    /// Open the detail view for a loaded university
    pub fn select(&mut self, id: UniversityId) -> bool {
        self.selected = self.universities.iter().find(|u| u.id == id).cloned();
        self.selected.is_some()
    }

    /// Fetch full detail (programs included) and open it
    pub async fn open_detail(
        &mut self,
        creds: &Credentials,
        id: UniversityId,
    ) -> Result<&University, ApiError> {
        match self.api.get_university(creds, id).await {
            Ok(u) => Ok(self.selected.insert(u)),
            Err(e) => {
                tracing::error!("Failed to load university {}: {}", id, e);
                self.error = Some(DETAIL_FAILED.to_string());
                Err(e)
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived view model
    // ─────────────────────────────────────────────────────────────────────────

    /// Applied-status, derived from the loaded applications every time
    pub fn has_applied(&self, id: UniversityId) -> bool {
        self.applications.iter().any(|a| a.university == id)
    }

    fn application_for(&self, id: UniversityId) -> Option<&Application> {
        self.applications.iter().find(|a| a.university == id)
    }

    /// Distinct countries on the loaded page (not the whole catalog)
    pub fn countries(&self) -> Vec<String> {
        distinct(self.universities.iter().map(|u| u.country.as_str()))
    }

    /// Distinct university types on the loaded page (not the whole catalog)
    pub fn university_types(&self) -> Vec<String> {
        distinct(self.universities.iter().map(|u| u.university_type.as_str()))
    }

    pub fn total_pages(&self) -> u32 {
        pagination::total_pages(self.total_count, self.page_size)
    }

    pub fn page_items(&self) -> Vec<PageItem> {
        pagination::page_items(self.total_pages(), self.filters.page)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn universities(&self) -> &[University] {
        &self.universities
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn selected(&self) -> Option<&University> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Transient message from the last apply/withdraw
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Set when the last application-list fetch failed
    pub fn applications_error(&self) -> Option<&str> {
        self.applications_error.as_deref()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{spawn, unreachable_client, FakeBackend, ADMIN_TOKEN, STUDENT_TOKEN};

    fn student() -> Credentials {
        Credentials::token(STUDENT_TOKEN)
    }

    fn uni(id: UniversityId, name: &str) -> University {
        serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
    }

    fn page_of(names: &[&str], total: u64) -> Result<ListResponse<University>, ApiError> {
        Ok(ListResponse::Paginated {
            count: total,
            next: None,
            previous: None,
            results: names
                .iter()
                .enumerate()
                .map(|(i, n)| uni(i as i64 + 1, n))
                .collect(),
        })
    }

    #[tokio::test]
    async fn test_refresh_loads_page_and_applications() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        api.apply(&student(), 2).await.unwrap();

        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        list.refresh(&student()).await;

        assert_eq!(list.universities().len(), 4);
        assert_eq!(list.total_count(), 4);
        assert_eq!(list.total_pages(), 1);
        assert!(list.has_applied(2));
        assert!(!list.has_applied(1));
        assert!(!list.is_loading());
        assert_eq!(list.error(), None);
    }

    #[tokio::test]
    async fn test_anonymous_refresh_skips_applications() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);

        list.refresh(&Credentials::anonymous()).await;

        assert_eq!(list.universities().len(), 4);
        assert_eq!(backend.application_list_calls(), 0);
    }

    #[tokio::test]
    async fn test_bare_list_response() {
        let backend = FakeBackend::seeded();
        backend.state().bare_list = true;
        let api = spawn(backend).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);

        list.refresh(&student()).await;

        assert_eq!(list.universities().len(), 4);
        assert_eq!(list.total_count(), 4);
    }

    #[tokio::test]
    async fn test_filter_dispatch_sends_active_filters_and_resets_page() {
        let backend = FakeBackend::with_many(30);
        let api = spawn(backend.clone()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        let creds = student();

        list.dispatch(&creds, FilterAction::SetPage(3)).await;
        assert_eq!(list.filters().page, 3);
        assert_eq!(
            backend.last_list_query().get("page").map(String::as_str),
            Some("3")
        );

        list.dispatch(&creds, FilterAction::SetCountry("Canada".into()))
            .await;
        let query = backend.last_list_query();
        assert_eq!(query.get("page").map(String::as_str), Some("1"));
        assert_eq!(query.get("country").map(String::as_str), Some("Canada"));
        assert!(!query.contains_key("scholarships"));
        assert!(!query.contains_key("search"));
        assert_eq!(list.total_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_filters_reloads_exactly_once() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        let creds = student();

        list.update(FilterAction::SetSearch("uni".into()));
        list.update(FilterAction::SetCountry("Canada".into()));
        list.update(FilterAction::SetType("public".into()));
        list.update(FilterAction::SetScholarshipsOnly(true));
        list.refresh(&creds).await;
        let before = backend.list_calls();

        list.clear_filters(&creds).await;

        assert_eq!(backend.list_calls(), before + 1);
        assert_eq!(list.filters(), &FilterState::default());
        let query = backend.last_list_query();
        assert_eq!(query.len(), 2, "only page and page_size: {:?}", query);
    }

    #[tokio::test]
    async fn test_apply_reload_withdraw_round_trip() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        let creds = student();
        list.refresh(&creds).await;
        assert!(!list.has_applied(3));

        list.apply(&creds, 3).await.unwrap();
        assert!(list.has_applied(3));
        assert!(!list.is_busy(3));

        let outcome = list.withdraw(&creds, 3).await.unwrap();
        assert_eq!(outcome, WithdrawOutcome::Withdrawn);
        assert!(!list.has_applied(3));
        assert!(backend.state().applications.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_apply_surfaces_notice_and_keeps_state() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        // Applied elsewhere; this controller's list is stale
        api.apply(&student(), 1).await.unwrap();

        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        list.refresh(&Credentials::anonymous()).await;
        assert!(!list.has_applied(1));

        let err = list.apply(&student(), 1).await.unwrap_err();
        assert!(matches!(err, ActionError::Failed(_)));
        assert_eq!(list.notice(), Some(APPLY_FAILED));
        assert!(!list.has_applied(1), "failed apply does not touch local state");
        assert!(!list.is_busy(1));
    }

    #[tokio::test]
    async fn test_withdraw_without_application_is_noop() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        list.refresh(&student()).await;
        let calls = backend.application_list_calls();

        let outcome = list.withdraw(&student(), 4).await.unwrap();

        assert_eq!(outcome, WithdrawOutcome::NotApplied);
        assert_eq!(backend.application_list_calls(), calls);
    }

    #[tokio::test]
    async fn test_toggle_application() {
        let api = spawn(FakeBackend::seeded()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        let creds = student();
        list.refresh(&creds).await;

        assert_eq!(
            list.toggle_application(&creds, 4).await.unwrap(),
            ToggleOutcome::Applied
        );
        assert!(list.has_applied(4));
        assert_eq!(
            list.toggle_application(&creds, 4).await.unwrap(),
            ToggleOutcome::Withdrawn
        );
        assert!(!list.has_applied(4));
    }

    #[test]
    fn test_busy_guard_refuses_second_request() {
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);
        list.begin_action(7).unwrap();
        assert!(list.is_busy(7));
        assert!(matches!(list.begin_action(7), Err(ActionError::Busy(7))));
        // Other universities are unaffected
        assert!(list.begin_action(8).is_ok());
        list.finish_action(7);
        assert!(!list.is_busy(7));
    }

    #[test]
    fn test_stale_catalog_response_is_dropped() {
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);

        list.update(FilterAction::SetSearch("a".into()));
        let first = list.begin_catalog_fetch();
        list.update(FilterAction::SetSearch("ab".into()));
        let second = list.begin_catalog_fetch();

        assert!(list.finish_catalog_fetch(&second, page_of(&["Newer"], 1)));
        assert!(!list.finish_catalog_fetch(&first, page_of(&["Older", "Older 2"], 2)));

        assert_eq!(list.universities().len(), 1);
        assert_eq!(list.universities()[0].name, "Newer");
        assert_eq!(list.total_count(), 1);
        assert_eq!(first.query.search.as_deref(), Some("a"));
        assert_eq!(second.query.search.as_deref(), Some("ab"));
    }

    #[test]
    fn test_catalog_and_applications_finish_in_either_order() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "id": 10, "university": 1, "status": "pending"
        }))
        .unwrap();

        for applications_first in [true, false] {
            let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);
            let catalog = list.begin_catalog_fetch();
            let apps = list.begin_applications_fetch();

            if applications_first {
                list.finish_applications_fetch(apps, Ok(vec![app.clone()]));
                list.finish_catalog_fetch(&catalog, page_of(&["A"], 1));
            } else {
                list.finish_catalog_fetch(&catalog, page_of(&["A"], 1));
                list.finish_applications_fetch(apps, Ok(vec![app.clone()]));
            }

            assert!(list.has_applied(1));
            assert_eq!(list.universities().len(), 1);
        }
    }

    #[test]
    fn test_catalog_error_sets_error_state() {
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);
        let ticket = list.begin_catalog_fetch();
        assert!(list.is_loading());

        list.finish_catalog_fetch(&ticket, Err(ApiError::Transport("down".into())));

        assert!(!list.is_loading());
        assert_eq!(list.error(), Some(LOAD_FAILED));
    }

    #[test]
    fn test_application_error_keeps_previous_list() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "id": 10, "university": 1, "status": "pending"
        }))
        .unwrap();
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);
        let t = list.begin_applications_fetch();
        list.finish_applications_fetch(t, Ok(vec![app]));

        let t = list.begin_applications_fetch();
        list.finish_applications_fetch(t, Err(ApiError::Transport("down".into())));
        assert!(list.has_applied(1));
        assert_eq!(list.applications_error(), Some("Failed to load applications"));

        // The next good response clears it
        let t = list.begin_applications_fetch();
        list.finish_applications_fetch(t, Ok(Vec::new()));
        assert_eq!(list.applications_error(), None);
    }

    #[tokio::test]
    async fn test_failed_application_reload_is_reported() {
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);

        let err = list.reload_applications(&student()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(list.applications_error(), Some("Failed to load applications"));
        assert!(list.applications().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_applies_applications_when_catalog_fails() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        api.apply(&student(), 3).await.unwrap();
        backend.state().list_fails = true;

        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        list.refresh(&student()).await;

        assert_eq!(list.error(), Some("Failed to load universities"));
        assert!(!list.is_loading());
        assert!(list.has_applied(3));
        assert_eq!(list.applications_error(), None);
    }

    #[test]
    fn test_option_sets_come_from_loaded_page() {
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);
        let ticket = list.begin_catalog_fetch();
        let items: Vec<University> = [
            (1, "USA", "private"),
            (2, "Canada", "public"),
            (3, "USA", ""),
            (4, "", "public"),
        ]
        .into_iter()
        .map(|(id, country, kind)| {
            serde_json::from_value(serde_json::json!({
                "id": id, "name": "U", "country": country, "university_type": kind
            }))
            .unwrap()
        })
        .collect();
        list.finish_catalog_fetch(&ticket, Ok(ListResponse::Bare(items)));

        assert_eq!(list.countries(), vec!["Canada", "USA"]);
        assert_eq!(list.university_types(), vec!["private", "public"]);
    }

    #[test]
    fn test_page_items_follow_total() {
        let mut list = ListController::new(unreachable_client(), 9);
        let ticket = list.begin_catalog_fetch();
        list.finish_catalog_fetch(&ticket, page_of(&["A"], 100));
        list.update(FilterAction::SetPage(7));

        assert_eq!(list.total_pages(), 12);
        let rendered: Vec<String> = list.page_items().iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["1", "...", "6", "7", "8", "...", "12"]);
    }

    #[tokio::test]
    async fn test_admin_scope_change_requests_reload() {
        let backend = FakeBackend::seeded();
        let api = spawn(backend.clone()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);
        let admin = Credentials::token(ADMIN_TOKEN);

        list.change_scope(&admin, Scope::Admin).await;
        assert_eq!(backend.list_calls(), 1);
        list.change_scope(&admin, Scope::Admin).await;
        assert_eq!(backend.list_calls(), 1, "same scope does not reload");

        assert_eq!(list.scope(), Scope::Admin);
        assert_eq!(
            backend.last_authorization().as_deref(),
            Some("Token admin-token")
        );
    }

    #[tokio::test]
    async fn test_open_detail_includes_programs() {
        let api = spawn(FakeBackend::seeded()).await;
        let mut list = ListController::new(api, DEFAULT_PAGE_SIZE);

        let detail = list.open_detail(&student(), 1).await.unwrap();
        assert_eq!(detail.programs.as_ref().map(Vec::len), Some(1));
        assert_eq!(list.selected().map(|u| u.id), Some(1));

        list.close_detail();
        assert!(list.selected().is_none());

        assert!(list.open_detail(&student(), 99).await.is_err());
        assert_eq!(list.error(), Some(DETAIL_FAILED));
    }

    #[test]
    fn test_view_mode_toggle() {
        let mut list = ListController::new(unreachable_client(), DEFAULT_PAGE_SIZE);
        assert_eq!(list.view_mode(), ViewMode::Grid);
        list.toggle_view_mode();
        assert_eq!(list.view_mode(), ViewMode::List);
        assert_eq!(ViewMode::parse("GRID"), Some(ViewMode::Grid));
        assert_eq!(ViewMode::parse("table"), None);
    }
}
