//! Wire models for the universities and auth endpoints
//!
//! The backend serializes decimal columns (fees, rates, IELTS) as strings like
//! `"20000.00"`, integer columns as numbers, and omits some fields on the list
//! endpoint. Everything optional here is `#[serde(default)]` so the same
//! `University` type reads both list items and detail responses.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::FieldErrors;

pub type UniversityId = i64;
pub type ApplicationId = i64;

// ─────────────────────────────────────────────────────────────────────────────
// Lenient numeric decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Accept `12.5`, `"12.50"`, `null`, `""`
fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Accept `1636`, `1636.0`, `"1636"`, `null`, `""`
fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Num(n)) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Ok(Some(n as i64)),
        Some(Raw::Num(n)) => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {}",
            n
        ))),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Accept `"2026-01-15"`, `null`, `""`
fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// `null` strings become empty strings
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// University
// ─────────────────────────────────────────────────────────────────────────────

/// A program offered by a university (detail endpoint only)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub degree_type: String,
    #[serde(default, deserialize_with = "opt_f64")]
    pub duration_years: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub tuition_fee: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub intake_months: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// University record as served by the catalog endpoints
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct University {
    pub id: UniversityId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub website: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,

    #[serde(default, deserialize_with = "opt_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub application_fee: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub tuition_fee: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub admission_rate: Option<f64>,
    /// Server-computed, e.g. "4.50%"
    #[serde(default)]
    pub admission_rate_display: Option<String>,

    #[serde(default, deserialize_with = "opt_i64")]
    pub founded_year: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub university_type: String,
    /// Server-computed, e.g. "Private"
    #[serde(default)]
    pub university_type_display: Option<String>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub ranking: Option<i64>,

    #[serde(default, deserialize_with = "opt_f64")]
    pub ielts_score: Option<f64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub toefl_score: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub gre_score: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub gmat_score: Option<i64>,

    #[serde(default)]
    pub scholarships_available: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scholarships_description: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub program_count: Option<u32>,
    #[serde(default)]
    pub programs: Option<Vec<Program>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for create (POST) and update (PATCH).
///
/// Absent numbers are sent as explicit `null`, never omitted, so an update
/// can clear a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniversityPayload {
    pub name: String,
    pub description: String,
    pub website: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub deadline: Option<NaiveDate>,
    pub application_fee: Option<f64>,
    pub tuition_fee: Option<f64>,
    pub admission_rate: Option<f64>,
    pub founded_year: Option<i64>,
    pub university_type: String,
    pub ranking: Option<i64>,
    pub ielts_score: Option<f64>,
    pub toefl_score: Option<i64>,
    pub gre_score: Option<i64>,
    pub gmat_score: Option<i64>,
    pub scholarships_available: bool,
    pub scholarships_description: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Applications
// ─────────────────────────────────────────────────────────────────────────────

/// Application status as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Waitlisted,
    /// Anything newer than this client knows about
    Other(String),
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Waitlisted => "waitlisted",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ApplicationStatus {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            "waitlisted" => Self::Waitlisted,
            _ => Self::Other(s),
        }
    }
}

impl From<ApplicationStatus> for String {
    fn from(status: ApplicationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's application to a university
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub university: UniversityId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub university_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub university_country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub university_city: String,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status_display: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// PATCH body for an application (admin)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApplyRequest {
    pub university_id: UniversityId,
}

/// Counters and recent activity for the dashboard
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub applied_count: u64,
    #[serde(default)]
    pub added_count: u64,
    #[serde(default)]
    pub recent_applications: Vec<Application>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

/// Query string for GET /universities/
///
/// Inactive filters are `None` and never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub university_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarships: Option<bool>,
}

/// A listing response: either a paginated envelope or a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    /// Items plus the total count across all pages
    pub fn into_parts(self) -> (Vec<T>, u64) {
        match self {
            ListResponse::Paginated { count, results, .. } => (results, count),
            ListResponse::Bare(items) => {
                let total = items.len() as u64;
                (items, total)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

impl User {
    /// "First Last", falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Response of login and register
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Minimum password length accepted by the signup form
pub const MIN_PASSWORD_LEN: usize = 8;

/// Signup fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterData {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl RegisterData {
    /// Checks done before anything is sent, keyed by field
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required");
        }
        if self.username.trim().is_empty() {
            errors.insert("username", "Username is required");
        }
        if self.password != self.password_confirm {
            errors.insert("password_confirm", "Passwords do not match");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password", "Password must be at least 8 characters");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
