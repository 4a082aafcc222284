// University catalog and application endpoints (under /universities)

use reqwest::Method;

use super::models::{
    Application, ApplicationId, ApplicationUpdate, ApplyRequest, CatalogQuery, DashboardStats,
    ListResponse, University, UniversityId, UniversityPayload,
};
use super::{ApiClient, ApiError, Credentials};

const BASE: &str = "/universities";

impl ApiClient {
    /// GET /universities/ - public catalog
    pub async fn list_universities(
        &self,
        creds: &Credentials,
        query: &CatalogQuery,
    ) -> Result<ListResponse<University>, ApiError> {
        tracing::debug!("Listing universities: {:?}", query);
        let req = self
            .request(Method::GET, &format!("{}/", BASE), creds)
            .query(query);
        self.send_json(req).await
    }

    /// GET /universities/ - admin scope.
    ///
    /// Same endpoint and parameters as [`list_universities`](Self::list_universities);
    /// the server narrows results to the caller's own records based on the
    /// token, not on anything in the query.
    pub async fn list_my_universities(
        &self,
        creds: &Credentials,
        query: &CatalogQuery,
    ) -> Result<ListResponse<University>, ApiError> {
        tracing::debug!("Listing admin universities: {:?}", query);
        let req = self
            .request(Method::GET, &format!("{}/", BASE), creds)
            .query(query);
        self.send_json(req).await
    }

    /// GET /universities/{id}/
    pub async fn get_university(
        &self,
        creds: &Credentials,
        id: UniversityId,
    ) -> Result<University, ApiError> {
        let req = self.request(Method::GET, &format!("{}/{}/", BASE, id), creds);
        self.send_json(req).await
    }

    /// POST /universities/ (admin)
    pub async fn create_university(
        &self,
        creds: &Credentials,
        payload: &UniversityPayload,
    ) -> Result<University, ApiError> {
        let req = self
            .request(Method::POST, &format!("{}/", BASE), creds)
            .json(payload);
        self.send_json(req).await
    }

    /// PATCH /universities/{id}/ (admin)
    pub async fn update_university(
        &self,
        creds: &Credentials,
        id: UniversityId,
        payload: &UniversityPayload,
    ) -> Result<University, ApiError> {
        let req = self
            .request(Method::PATCH, &format!("{}/{}/", BASE, id), creds)
            .json(payload);
        self.send_json(req).await
    }

    /// DELETE /universities/{id}/ (admin)
    pub async fn delete_university(
        &self,
        creds: &Credentials,
        id: UniversityId,
    ) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("{}/{}/", BASE, id), creds);
        self.send_empty(req).await
    }

    /// GET /universities/dashboard-stats/
    pub async fn dashboard_stats(&self, creds: &Credentials) -> Result<DashboardStats, ApiError> {
        let req = self.request(Method::GET, &format!("{}/dashboard-stats/", BASE), creds);
        self.send_json(req).await
    }

    /// POST /universities/apply/
    pub async fn apply(
        &self,
        creds: &Credentials,
        university_id: UniversityId,
    ) -> Result<Application, ApiError> {
        let req = self
            .request(Method::POST, &format!("{}/apply/", BASE), creds)
            .json(&ApplyRequest { university_id });
        self.send_json(req).await
    }

    /// GET /universities/my-applications/
    pub async fn my_applications(&self, creds: &Credentials) -> Result<Vec<Application>, ApiError> {
        let req = self.request(Method::GET, &format!("{}/my-applications/", BASE), creds);
        let list: ListResponse<Application> = self.send_json(req).await?;
        Ok(list.into_parts().0)
    }

    /// DELETE /universities/applications/{id}/withdraw/
    pub async fn withdraw_application(
        &self,
        creds: &Credentials,
        application_id: ApplicationId,
    ) -> Result<(), ApiError> {
        let req = self.request(
            Method::DELETE,
            &format!("{}/applications/{}/withdraw/", BASE, application_id),
            creds,
        );
        self.send_empty(req).await
    }

    /// GET /universities/applications/ (admin listing)
    pub async fn list_applications(
        &self,
        creds: &Credentials,
    ) -> Result<Vec<Application>, ApiError> {
        let req = self.request(Method::GET, &format!("{}/applications/", BASE), creds);
        let list: ListResponse<Application> = self.send_json(req).await?;
        Ok(list.into_parts().0)
    }

    /// PATCH /universities/applications/{id}/
    pub async fn update_application(
        &self,
        creds: &Credentials,
        application_id: ApplicationId,
        update: &ApplicationUpdate,
    ) -> Result<Application, ApiError> {
        let req = self
            .request(
                Method::PATCH,
                &format!("{}/applications/{}/", BASE, application_id),
                creds,
            )
            .json(update);
        self.send_json(req).await
    }
}
