//! In-process fake of the backend for tests
//!
//! An axum router bound to 127.0.0.1:0 that implements just enough of the
//! universities and auth endpoints to exercise the client, session and
//! controllers end to end. It records what it saw (query strings, auth
//! headers, call counts) so tests can assert on the wire traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::ApiClient;

pub(crate) const STUDENT_TOKEN: &str = "student-token";
pub(crate) const ADMIN_TOKEN: &str = "admin-token";
pub(crate) const STUDENT_EMAIL: &str = "student@example.com";
pub(crate) const STUDENT_PASSWORD: &str = "password123";

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub universities: Vec<Value>,
    pub applications: Vec<Value>,
    /// token -> user
    pub tokens: HashMap<String, Value>,
    /// email -> (password, token)
    pub accounts: HashMap<String, (String, String)>,
    pub next_university_id: i64,
    pub next_application_id: i64,
    pub next_user_id: i64,

    pub list_calls: usize,
    pub application_list_calls: usize,
    pub logout_calls: usize,
    pub last_list_query: HashMap<String, String>,
    pub last_authorization: Option<String>,
    pub last_payload: Option<Value>,

    /// Answer listings with a bare array instead of the paginated envelope
    pub bare_list: bool,
    /// Make /auth/logout/ fail with 500
    pub logout_fails: bool,
    /// Make university listings fail with 500
    pub list_fails: bool,
    /// Make the next create/update fail with this status and body
    pub fail_next_save: Option<(u16, Value)>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    inner: Arc<Mutex<FakeState>>,
}

fn university(id: i64, name: &str, country: &str, kind: &str, scholarships: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "website": "",
        "country": country,
        "city": "",
        "address": "",
        "deadline": null,
        "application_fee": "85.00",
        "tuition_fee": "20000.00",
        "admission_rate": null,
        "admission_rate_display": null,
        "founded_year": null,
        "university_type": kind,
        "ranking": id,
        "ielts_score": null,
        "toefl_score": null,
        "gre_score": null,
        "gmat_score": null,
        "scholarships_available": scholarships,
        "scholarships_description": "",
        "email": "",
        "phone": "",
        "is_active": true,
        "created_by": 2,
    })
}

fn user(id: i64, email: &str, username: &str, staff: bool) -> Value {
    json!({
        "id": id,
        "email": email,
        "username": username,
        "first_name": "",
        "last_name": "",
        "is_staff": staff,
    })
}

fn status_display(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl FakeBackend {
    /// Four universities, one student and one admin account
    pub fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut s = backend.state();
            s.universities = vec![
                university(1, "Harvard University", "USA", "private", true),
                university(2, "University of Toronto", "Canada", "public", false),
                university(3, "McGill University", "Canada", "public", true),
                university(4, "University of Oxford", "UK", "public", true),
            ];
            s.next_university_id = 5;
            s.next_application_id = 1;
            s.next_user_id = 3;

            s.tokens.insert(
                STUDENT_TOKEN.to_string(),
                user(1, STUDENT_EMAIL, "student", false),
            );
            s.tokens.insert(
                ADMIN_TOKEN.to_string(),
                user(2, "admin@example.com", "admin", true),
            );
            s.accounts.insert(
                STUDENT_EMAIL.to_string(),
                (STUDENT_PASSWORD.to_string(), STUDENT_TOKEN.to_string()),
            );
        }
        backend
    }

    /// Seeded backend plus `extra` generated universities
    pub fn with_many(extra: usize) -> Self {
        let backend = Self::seeded();
        {
            let mut s = backend.state();
            for _ in 0..extra {
                let id = s.next_university_id;
                s.next_university_id += 1;
                s.universities.push(university(
                    id,
                    &format!("Generated University {}", id),
                    "Germany",
                    "public",
                    false,
                ));
            }
        }
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap()
    }

    fn observe(&self, headers: &HeaderMap) -> MutexGuard<'_, FakeState> {
        let mut s = self.state();
        s.last_authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        s
    }

    pub fn last_list_query(&self) -> HashMap<String, String> {
        self.state().last_list_query.clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state().last_authorization.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    pub fn application_list_calls(&self) -> usize {
        self.state().application_list_calls
    }
}

impl FakeState {
    fn caller(&self) -> Option<Value> {
        let header = self.last_authorization.as_deref()?;
        let token = header.strip_prefix("Token ")?;
        self.tokens.get(token).cloned()
    }
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    json_response(
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Invalid token."}),
    )
}

fn not_found(what: &str) -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        json!({"error": format!("{} not found", what)}),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Universities
// ─────────────────────────────────────────────────────────────────────────────

async fn list_universities(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut s = backend.observe(&headers);
    s.list_calls += 1;
    s.last_list_query = params.clone();
    if s.list_fails {
        return json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "database unavailable"}),
        );
    }

    let search = params.get("search").map(|v| v.to_lowercase());
    let matching: Vec<Value> = s
        .universities
        .iter()
        .filter(|u| {
            let name = u["name"].as_str().unwrap_or_default().to_lowercase();
            search.as_ref().map_or(true, |q| name.contains(q))
        })
        .filter(|u| {
            params
                .get("country")
                .map_or(true, |c| u["country"].as_str() == Some(c.as_str()))
        })
        .filter(|u| {
            params
                .get("type")
                .map_or(true, |t| u["university_type"].as_str() == Some(t.as_str()))
        })
        .filter(|u| {
            params.get("scholarships").map_or(true, |v| {
                v != "true" || u["scholarships_available"].as_bool() == Some(true)
            })
        })
        .cloned()
        .collect();

    if s.bare_list {
        return json_response(StatusCode::OK, Value::Array(matching));
    }

    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let page_size: usize = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(10);

    let count = matching.len();
    let results: Vec<Value> = matching
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    json_response(
        StatusCode::OK,
        json!({"count": count, "next": null, "previous": null, "results": results}),
    )
}

async fn get_university(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let s = backend.observe(&headers);
    match s.universities.iter().find(|u| u["id"] == id) {
        Some(u) => {
            let mut detail = u.clone();
            detail["programs"] = json!([{
                "id": 1,
                "name": "Computer Science",
                "degree_type": "masters",
                "duration_years": "2.0",
                "tuition_fee": null,
                "intake_months": "September",
                "description": "",
                "requirements": "",
                "is_active": true,
            }]);
            json_response(StatusCode::OK, detail)
        }
        None => json_response(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
    }
}

fn take_save_failure(s: &mut FakeState) -> Option<Response> {
    s.fail_next_save.take().map(|(status, body)| {
        json_response(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
    })
}

async fn create_university(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = backend.observe(&headers);
    let Some(caller) = s.caller() else {
        return unauthorized();
    };
    s.last_payload = Some(body.clone());
    if let Some(failure) = take_save_failure(&mut s) {
        return failure;
    }
    if body["name"].as_str().map_or(true, str::is_empty) {
        return json_response(
            StatusCode::BAD_REQUEST,
            json!({"name": ["This field is required."]}),
        );
    }

    let id = s.next_university_id;
    s.next_university_id += 1;
    let mut record = body;
    record["id"] = json!(id);
    record["created_by"] = caller["id"].clone();
    s.universities.push(record.clone());
    json_response(StatusCode::CREATED, record)
}

async fn update_university(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = backend.observe(&headers);
    if s.caller().is_none() {
        return unauthorized();
    }
    s.last_payload = Some(body.clone());
    if let Some(failure) = take_save_failure(&mut s) {
        return failure;
    }

    let Some(record) = s.universities.iter_mut().find(|u| u["id"] == id) else {
        return not_found("University");
    };
    if let (Some(target), Some(patch)) = (record.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
    json_response(StatusCode::OK, record.clone())
}

async fn delete_university(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut s = backend.observe(&headers);
    if s.caller().is_none() {
        return unauthorized();
    }
    let before = s.universities.len();
    s.universities.retain(|u| u["id"] != id);
    if s.universities.len() == before {
        return not_found("University");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn dashboard_stats(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    let s = backend.observe(&headers);
    let Some(caller) = s.caller() else {
        return unauthorized();
    };
    let mine: Vec<Value> = s
        .applications
        .iter()
        .filter(|a| a["user"] == caller["id"])
        .cloned()
        .collect();
    let added = s
        .universities
        .iter()
        .filter(|u| u["created_by"] == caller["id"])
        .count();
    let added_count = if caller["is_staff"] == true { added } else { 0 };
    let recent: Vec<Value> = mine.iter().take(5).cloned().collect();

    json_response(
        StatusCode::OK,
        json!({
            "applied_count": mine.len(),
            "added_count": added_count,
            "recent_applications": recent,
        }),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Applications
// ─────────────────────────────────────────────────────────────────────────────

async fn apply(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = backend.observe(&headers);
    let Some(caller) = s.caller() else {
        return unauthorized();
    };
    let Some(university_id) = body["university_id"].as_i64() else {
        return json_response(
            StatusCode::BAD_REQUEST,
            json!({"error": "university_id is required"}),
        );
    };
    let Some(uni) = s
        .universities
        .iter()
        .find(|u| u["id"] == university_id)
        .cloned()
    else {
        return not_found("University");
    };
    if s
        .applications
        .iter()
        .any(|a| a["user"] == caller["id"] && a["university"] == university_id)
    {
        return json_response(
            StatusCode::BAD_REQUEST,
            json!({"error": "You have already applied to this university"}),
        );
    }

    let id = s.next_application_id;
    s.next_application_id += 1;
    let app = json!({
        "id": id,
        "user": caller["id"],
        "university": university_id,
        "university_name": uni["name"],
        "university_country": uni["country"],
        "university_city": uni["city"],
        "status": "pending",
        "status_display": "Pending",
        "notes": "",
        "applied_at": "2026-10-01T12:00:00Z",
        "updated_at": "2026-10-01T12:00:00Z",
    });
    s.applications.push(app.clone());
    json_response(StatusCode::CREATED, app)
}

async fn my_applications(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    let mut s = backend.observe(&headers);
    s.application_list_calls += 1;
    let Some(caller) = s.caller() else {
        return unauthorized();
    };
    let mine: Vec<Value> = s
        .applications
        .iter()
        .filter(|a| a["user"] == caller["id"])
        .cloned()
        .collect();
    json_response(StatusCode::OK, Value::Array(mine))
}

async fn withdraw(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut s = backend.observe(&headers);
    let Some(caller) = s.caller() else {
        return unauthorized();
    };
    let before = s.applications.len();
    s.applications
        .retain(|a| !(a["id"] == id && a["user"] == caller["id"]));
    if s.applications.len() == before {
        return not_found("Application");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn all_applications(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    let s = backend.observe(&headers);
    match s.caller() {
        Some(caller) if caller["is_staff"] == true => {
            json_response(StatusCode::OK, Value::Array(s.applications.clone()))
        }
        Some(_) => json_response(
            StatusCode::FORBIDDEN,
            json!({"detail": "You do not have permission to perform this action."}),
        ),
        None => unauthorized(),
    }
}

async fn update_application(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = backend.observe(&headers);
    if s.caller().is_none() {
        return unauthorized();
    }
    let Some(app) = s.applications.iter_mut().find(|a| a["id"] == id) else {
        return not_found("Application");
    };
    if let Some(status) = body["status"].as_str() {
        app["status"] = json!(status);
        app["status_display"] = json!(status_display(status));
    }
    if let Some(notes) = body["notes"].as_str() {
        app["notes"] = json!(notes);
    }
    json_response(StatusCode::OK, app.clone())
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

async fn login(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let s = backend.observe(&headers);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match s.accounts.get(email) {
        Some((expected, token)) if expected == password => {
            let user = s.tokens.get(token).cloned().unwrap_or(Value::Null);
            json_response(StatusCode::OK, json!({"user": user, "token": token}))
        }
        _ => json_response(
            StatusCode::BAD_REQUEST,
            json!({"error": "Invalid email or password"}),
        ),
    }
}

async fn register(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = backend.observe(&headers);
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();

    let mut errors = serde_json::Map::new();
    if username == "taken" {
        errors.insert("username".into(), json!(["already taken"]));
    }
    if !email.contains('@') {
        errors.insert("email".into(), json!(["invalid"]));
    }
    if !errors.is_empty() {
        return json_response(StatusCode::BAD_REQUEST, Value::Object(errors));
    }

    let id = s.next_user_id;
    s.next_user_id += 1;
    let token = format!("token-{}", username);
    let account = user(id, &email, &username, false);
    s.tokens.insert(token.clone(), account.clone());
    let password = body["password"].as_str().unwrap_or_default().to_string();
    s.accounts.insert(email, (password, token.clone()));

    json_response(StatusCode::CREATED, json!({"user": account, "token": token}))
}

async fn current_user(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    let s = backend.observe(&headers);
    match s.caller() {
        Some(user) => json_response(StatusCode::OK, user),
        None => unauthorized(),
    }
}

async fn logout(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    let mut s = backend.observe(&headers);
    s.logout_calls += 1;
    if s.logout_fails {
        return json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Error during logout"}),
        );
    }
    if let Some(token) = s
        .last_authorization
        .clone()
        .and_then(|h| h.strip_prefix("Token ").map(String::from))
    {
        s.tokens.remove(&token);
    }
    json_response(
        StatusCode::OK,
        json!({"message": "Successfully logged out"}),
    )
}

fn router(backend: FakeBackend) -> Router {
    Router::new()
        .route(
            "/api/universities/",
            get(list_universities).post(create_university),
        )
        .route("/api/universities/dashboard-stats/", get(dashboard_stats))
        .route("/api/universities/apply/", post(apply))
        .route("/api/universities/my-applications/", get(my_applications))
        .route("/api/universities/applications/", get(all_applications))
        .route(
            "/api/universities/applications/:id/",
            patch(update_application),
        )
        .route(
            "/api/universities/applications/:id/withdraw/",
            delete(withdraw),
        )
        .route(
            "/api/universities/:id/",
            get(get_university)
                .patch(update_university)
                .delete(delete_university),
        )
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/user/", get(current_user))
        .route("/api/auth/logout/", post(logout))
        .with_state(backend)
}

/// Serve `backend` on an ephemeral port and return a client pointed at it
pub(crate) async fn spawn(backend: FakeBackend) -> ApiClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(backend)).await.unwrap();
    });
    ApiClient::new(&format!("http://{}/api", addr), Duration::from_secs(5)).unwrap()
}

/// A client pointed at a port nothing listens on
pub(crate) fn unreachable_client() -> ApiClient {
    ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap()
}
