// Auth endpoints (under /auth)

use reqwest::Method;

use super::models::{AuthResponse, LoginRequest, RegisterData, User};
use super::{ApiClient, ApiError, Credentials};

impl ApiClient {
    /// POST /auth/login/ - exchange credentials for (user, token)
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self
            .request(Method::POST, "/auth/login/", &Credentials::anonymous())
            .json(&LoginRequest { email, password });
        self.send_json(req).await
    }

    /// POST /auth/register/
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        let req = self
            .request(Method::POST, "/auth/register/", &Credentials::anonymous())
            .json(data);
        self.send_json(req).await
    }

    /// GET /auth/user/ - resolve the token to its account
    pub async fn current_user(&self, creds: &Credentials) -> Result<User, ApiError> {
        let req = self.request(Method::GET, "/auth/user/", creds);
        self.send_json(req).await
    }

    /// POST /auth/logout/ - invalidate the token server-side
    pub async fn logout(&self, creds: &Credentials) -> Result<(), ApiError> {
        let req = self.request(Method::POST, "/auth/logout/", creds);
        self.send_empty(req).await
    }
}
