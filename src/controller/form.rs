//! Create/edit form for universities
//!
//! [`UniversityForm`] is the flat, all-text state an input widget binds to.
//! Loading stringifies every number (absent becomes ""), and
//! [`UniversityForm::to_payload`] parses them back with the right numeric
//! kind. Empty inputs become `null`; anything non-numeric is rejected with a
//! per-field message instead of being sent.

use std::time::Duration;

use chrono::NaiveDate;

use crate::api::{
    ApiClient, ApiError, Credentials, FieldErrors, University, UniversityId, UniversityPayload,
};

const LOAD_FAILED: &str = "Failed to load university data";
const SAVE_FAILED: &str = "Failed to save university";
const UNEXPECTED: &str = "An unexpected error occurred";
const INVALID_INPUT: &str = "Please correct the highlighted fields";

const NOT_WHOLE_NUMBER: &str = "Enter a whole number";
const NOT_NUMBER: &str = "Enter a valid number";
const NOT_DATE: &str = "Enter a date as YYYY-MM-DD";
const NOT_BOOL: &str = "Enter true or false";

/// Delay between the success message and navigating away
pub const DEFAULT_NAVIGATE_DELAY: Duration = Duration::from_millis(1500);

/// Every field the form edits, as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityForm {
    pub name: String,
    pub description: String,
    pub website: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub deadline: String,
    pub application_fee: String,
    pub tuition_fee: String,
    pub admission_rate: String,
    pub founded_year: String,
    pub university_type: String,
    pub ranking: String,
    pub ielts_score: String,
    pub toefl_score: String,
    pub gre_score: String,
    pub gmat_score: String,
    pub scholarships_available: bool,
    pub scholarships_description: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
}

impl Default for UniversityForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            website: String::new(),
            country: String::new(),
            city: String::new(),
            address: String::new(),
            deadline: String::new(),
            application_fee: String::new(),
            tuition_fee: String::new(),
            admission_rate: String::new(),
            founded_year: String::new(),
            university_type: "private".to_string(),
            ranking: String::new(),
            ielts_score: String::new(),
            toefl_score: String::new(),
            gre_score: String::new(),
            gmat_score: String::new(),
            scholarships_available: false,
            scholarships_description: String::new(),
            email: String::new(),
            phone: String::new(),
            is_active: true,
        }
    }
}

/// Field names accepted by [`UniversityForm::set`]
pub const FIELDS: &[&str] = &[
    "name",
    "description",
    "website",
    "country",
    "city",
    "address",
    "deadline",
    "application_fee",
    "tuition_fee",
    "admission_rate",
    "founded_year",
    "university_type",
    "ranking",
    "ielts_score",
    "toefl_score",
    "gre_score",
    "gmat_score",
    "scholarships_available",
    "scholarships_description",
    "email",
    "phone",
    "is_active",
];

fn text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl UniversityForm {
    /// Form state for editing `university`, or a blank form when None
    pub fn from_university(university: Option<&University>) -> Self {
        let Some(u) = university else {
            return Self::default();
        };
        Self {
            name: u.name.clone(),
            description: u.description.clone(),
            website: u.website.clone(),
            country: u.country.clone(),
            city: u.city.clone(),
            address: u.address.clone(),
            deadline: u
                .deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            application_fee: text(u.application_fee),
            tuition_fee: text(u.tuition_fee),
            admission_rate: text(u.admission_rate),
            founded_year: text(u.founded_year),
            university_type: if u.university_type.is_empty() {
                "private".to_string()
            } else {
                u.university_type.clone()
            },
            ranking: text(u.ranking),
            ielts_score: text(u.ielts_score),
            toefl_score: text(u.toefl_score),
            gre_score: text(u.gre_score),
            gmat_score: text(u.gmat_score),
            scholarships_available: u.scholarships_available,
            scholarships_description: u.scholarships_description.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            is_active: u.is_active,
        }
    }

    /// Set one field from text input. Returns a message for unknown fields
    /// and unreadable booleans.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), String> {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "website" => &mut self.website,
            "country" => &mut self.country,
            "city" => &mut self.city,
            "address" => &mut self.address,
            "deadline" => &mut self.deadline,
            "application_fee" => &mut self.application_fee,
            "tuition_fee" => &mut self.tuition_fee,
            "admission_rate" => &mut self.admission_rate,
            "founded_year" => &mut self.founded_year,
            "university_type" => &mut self.university_type,
            "ranking" => &mut self.ranking,
            "ielts_score" => &mut self.ielts_score,
            "toefl_score" => &mut self.toefl_score,
            "gre_score" => &mut self.gre_score,
            "gmat_score" => &mut self.gmat_score,
            "scholarships_description" => &mut self.scholarships_description,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "scholarships_available" => {
                self.scholarships_available = parse_bool(value).ok_or(NOT_BOOL)?;
                return Ok(());
            }
            "is_active" => {
                self.is_active = parse_bool(value).ok_or(NOT_BOOL)?;
                return Ok(());
            }
            other => return Err(format!("Unknown field '{}'", other)),
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Typed payload, or the fields that failed to parse
    pub fn to_payload(&self) -> Result<UniversityPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let e = &mut errors;
        let founded_year = checked(e, "founded_year", parse_int(&self.founded_year));
        let ranking = checked(e, "ranking", parse_int(&self.ranking));
        let toefl_score = checked(e, "toefl_score", parse_int(&self.toefl_score));
        let gre_score = checked(e, "gre_score", parse_int(&self.gre_score));
        let gmat_score = checked(e, "gmat_score", parse_int(&self.gmat_score));
        let application_fee = checked(e, "application_fee", parse_float(&self.application_fee));
        let tuition_fee = checked(e, "tuition_fee", parse_float(&self.tuition_fee));
        let admission_rate = checked(e, "admission_rate", parse_float(&self.admission_rate));
        let ielts_score = checked(e, "ielts_score", parse_float(&self.ielts_score));
        let deadline = checked(e, "deadline", parse_date(&self.deadline));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UniversityPayload {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            website: self.website.trim().to_string(),
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
            address: self.address.clone(),
            deadline,
            application_fee,
            tuition_fee,
            admission_rate,
            founded_year,
            university_type: self.university_type.trim().to_string(),
            ranking,
            ielts_score,
            toefl_score,
            gre_score,
            gmat_score,
            scholarships_available: self.scholarships_available,
            scholarships_description: self.scholarships_description.clone(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            is_active: self.is_active,
        })
    }
}

/// Unwrap a parsed field, recording its message on failure
fn checked<T>(
    errors: &mut FieldErrors,
    field: &str,
    parsed: Result<Option<T>, &'static str>,
) -> Option<T> {
    parsed.unwrap_or_else(|message| {
        errors.insert(field, message);
        None
    })
}

fn parse_int(value: &str) -> Result<Option<i64>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<i64>().map(Some).map_err(|_| NOT_WHOLE_NUMBER)
}

fn parse_float(value: &str) -> Result<Option<f64>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(NOT_NUMBER),
    }
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| NOT_DATE)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Creating a new record or editing an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(UniversityId),
}

/// A successful save
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub university: University,
    pub message: &'static str,
    /// Show `message` at least this long before navigating away
    pub navigate_after: Duration,
}

/// Why a submit did not save
#[derive(Debug)]
pub enum SubmitError {
    /// Input did not parse; nothing was sent
    Invalid(FieldErrors),
    /// The server rejected or never answered the request
    Api(ApiError),
    /// A submit is already in flight
    InProgress,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(fields) => write!(f, "Invalid input: {}", fields.flatten()),
            Self::Api(e) => write!(f, "{}", e),
            Self::InProgress => write!(f, "A save is already in progress"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Load/edit/submit state for the university form
pub struct FormController {
    api: ApiClient,
    mode: FormMode,
    form: UniversityForm,
    loading: bool,
    submitting: bool,
    error: Option<String>,
    field_errors: FieldErrors,
    success: Option<&'static str>,
    navigate_delay: Duration,
}

impl FormController {
    pub fn create(api: ApiClient) -> Self {
        Self::with_mode(api, FormMode::Create)
    }

    pub fn edit(api: ApiClient, id: UniversityId) -> Self {
        Self::with_mode(api, FormMode::Edit(id))
    }

    fn with_mode(api: ApiClient, mode: FormMode) -> Self {
        Self {
            api,
            mode,
            form: UniversityForm::default(),
            loading: false,
            submitting: false,
            error: None,
            field_errors: FieldErrors::new(),
            success: None,
            navigate_delay: DEFAULT_NAVIGATE_DELAY,
        }
    }

    pub fn with_navigate_delay(mut self, delay: Duration) -> Self {
        self.navigate_delay = delay;
        self
    }

    /// Populate the form from the server. No-op in create mode.
    pub async fn load(&mut self, creds: &Credentials) -> Result<(), ApiError> {
        let FormMode::Edit(id) = self.mode else {
            return Ok(());
        };

        self.loading = true;
        self.error = None;
        let result = self.api.get_university(creds, id).await;
        self.loading = false;

        match result {
            Ok(university) => {
                self.form = UniversityForm::from_university(Some(&university));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load university {}: {}", id, e);
                self.error = Some(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    pub fn form(&self) -> &UniversityForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UniversityForm {
        &mut self.form
    }

    /// Set a field, clearing any server error recorded for it
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), String> {
        self.form.set(field, value)?;
        self.field_errors.remove(field);
        Ok(())
    }

    /// Create or update depending on mode
    pub async fn submit(&mut self, creds: &Credentials) -> Result<SubmitOutcome, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InProgress);
        }
        self.error = None;
        self.success = None;
        self.field_errors = FieldErrors::new();

        let payload = match self.form.to_payload() {
            Ok(p) => p,
            Err(fields) => {
                self.error = Some(INVALID_INPUT.to_string());
                self.field_errors = fields.clone();
                return Err(SubmitError::Invalid(fields));
            }
        };

        self.submitting = true;
        let (result, message) = match self.mode {
            FormMode::Create => (
                self.api.create_university(creds, &payload).await,
                "University created successfully!",
            ),
            FormMode::Edit(id) => (
                self.api.update_university(creds, id, &payload).await,
                "University updated successfully!",
            ),
        };
        self.submitting = false;

        match result {
            Ok(university) => {
                tracing::info!("Saved university {} ({})", university.id, university.name);
                self.success = Some(message);
                Ok(SubmitOutcome {
                    university,
                    message,
                    navigate_after: self.navigate_delay,
                })
            }
            Err(e) => {
                tracing::error!("Failed to save university: {}", e);
                self.error = Some(submit_error_message(&e));
                self.field_errors = e
                    .payload()
                    .map(|p| p.field_errors())
                    .unwrap_or_default();
                Err(SubmitError::Api(e))
            }
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn success(&self) -> Option<&str> {
        self.success
    }
}

/// Prefer the server's `message`, otherwise a generic line
fn submit_error_message(error: &ApiError) -> String {
    match error {
        ApiError::Decode(_) => UNEXPECTED.to_string(),
        other => other
            .payload()
            .and_then(|p| p.message())
            .unwrap_or(SAVE_FAILED)
            .to_string(),
    }
}
