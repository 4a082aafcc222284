// Dashboard and admin application review

use crate::api::{
    ApiClient, ApiError, Application, ApplicationId, ApplicationStatus, ApplicationUpdate,
    Credentials, DashboardStats,
};

const STATS_FAILED: &str = "Failed to load dashboard";
const APPLICATIONS_FAILED: &str = "Failed to load applications";
const UPDATE_FAILED: &str = "Failed to update application";

/// Counters for the signed-in user, plus the full application list for admins
pub struct DashboardController {
    api: ApiClient,
    stats: Option<DashboardStats>,
    applications: Vec<Application>,
    loading: bool,
    error: Option<String>,
}

impl DashboardController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            stats: None,
            applications: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub async fn load(&mut self, creds: &Credentials) -> Result<&DashboardStats, ApiError> {
        self.loading = true;
        self.error = None;
        let result = self.api.dashboard_stats(creds).await;
        self.loading = false;

        match result {
            Ok(stats) => Ok(self.stats.insert(stats)),
            Err(e) => {
                tracing::error!("Failed to load dashboard stats: {}", e);
                self.error = Some(STATS_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Every user's applications (admin only)
    pub async fn load_applications(
        &mut self,
        creds: &Credentials,
        status: Option<&ApplicationStatus>,
    ) -> Result<&[Application], ApiError> {
        self.loading = true;
        self.error = None;
        let result = self.api.list_applications(creds).await;
        self.loading = false;

        match result {
            Ok(mut apps) => {
                if let Some(wanted) = status {
                    apps.retain(|a| &a.status == wanted);
                }
                self.applications = apps;
                Ok(&self.applications)
            }
            Err(e) => {
                tracing::error!("Failed to load applications: {}", e);
                self.error = Some(APPLICATIONS_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Change an application's status and replace it in the loaded list
    pub async fn set_status(
        &mut self,
        creds: &Credentials,
        id: ApplicationId,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<Application, ApiError> {
        let update = ApplicationUpdate {
            status: Some(status),
            notes,
        };
        match self.api.update_application(creds, id, &update).await {
            Ok(updated) => {
                tracing::info!("Application {} is now {}", id, updated.status);
                if let Some(slot) = self.applications.iter_mut().find(|a| a.id == id) {
                    *slot = updated.clone();
                }
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!("Failed to update application {}: {}", id, e);
                self.error = Some(UPDATE_FAILED.to_string());
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
