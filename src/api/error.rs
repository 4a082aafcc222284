//! API error types and error-body parsing
//!
//! Every non-2xx response body goes through [`ErrorPayload::parse`] exactly
//! once. Callers then pick the representation they need: the `error` string
//! for login, the `message` string for the university form, per-field
//! messages for inline display, or the flattened one-line summary.

use std::fmt;

use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Field errors
// ─────────────────────────────────────────────────────────────────────────────

/// First error message per field, in the order the server listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. A field keeps its first message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    /// Drop the message for `field`, if any
    pub fn remove(&mut self, field: &str) {
        self.entries.retain(|(name, _)| name != field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, msg)| msg.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// All messages joined with ", " (field names dropped)
    pub fn flatten(&self) -> String {
        self.entries
            .iter()
            .map(|(_, msg)| msg.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error payload
// ─────────────────────────────────────────────────────────────────────────────

/// Which key a single-message payload used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Error,
    Message,
    Detail,
}

impl MessageKey {
    fn as_str(&self) -> &'static str {
        match self {
            MessageKey::Error => "error",
            MessageKey::Message => "message",
            MessageKey::Detail => "detail",
        }
    }
}

/// Parsed shape of an error response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// `{"error": "..."}`, `{"message": "..."}` or `{"detail": "..."}`
    Message { key: MessageKey, text: String },
    /// `{"field": ["msg", ...], "other": "msg"}`
    Fields(FieldErrors),
    /// Body that was not a JSON object (HTML error page, plain text, list)
    Unstructured(String),
    /// No body at all
    Empty,
}

impl ErrorPayload {
    /// Parse a raw response body
    pub fn parse(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ErrorPayload::Empty;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => {
                for key in [MessageKey::Error, MessageKey::Message, MessageKey::Detail] {
                    if let Some(Value::String(s)) = map.get(key.as_str()) {
                        return ErrorPayload::Message {
                            key,
                            text: s.clone(),
                        };
                    }
                }

                let mut fields = FieldErrors::new();
                for (name, value) in &map {
                    if let Some(msg) = first_message(value) {
                        fields.insert(name.clone(), msg);
                    }
                }
                if fields.is_empty() {
                    ErrorPayload::Unstructured(trimmed.to_string())
                } else {
                    ErrorPayload::Fields(fields)
                }
            }
            Ok(Value::Array(items)) => match items.iter().find_map(first_message) {
                Some(msg) => ErrorPayload::Unstructured(msg),
                None => ErrorPayload::Unstructured(trimmed.to_string()),
            },
            _ => ErrorPayload::Unstructured(trimmed.to_string()),
        }
    }

    /// The `error` string, if that is what the server sent
    pub fn error_message(&self) -> Option<&str> {
        self.keyed(MessageKey::Error)
    }

    /// The `message` string, if that is what the server sent
    pub fn message(&self) -> Option<&str> {
        self.keyed(MessageKey::Message)
    }

    fn keyed(&self, wanted: MessageKey) -> Option<&str> {
        match self {
            ErrorPayload::Message { key, text } if *key == wanted => Some(text),
            _ => None,
        }
    }

    /// Per-field messages (empty unless the payload was a field mapping)
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            ErrorPayload::Fields(fields) => fields.clone(),
            _ => FieldErrors::new(),
        }
    }

    /// One-line summary, or None when the payload carries nothing readable
    pub fn flatten(&self) -> Option<String> {
        match self {
            ErrorPayload::Message { text, .. } => Some(text.clone()),
            ErrorPayload::Fields(fields) if !fields.is_empty() => Some(fields.flatten()),
            _ => None,
        }
    }
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API error
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by the REST client
#[derive(Debug)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, TLS...
    Transport(String),
    /// 401 / 403
    Unauthorized { status: u16, payload: ErrorPayload },
    /// 400 with a validation body
    Validation { payload: ErrorPayload },
    /// 404
    NotFound { payload: ErrorPayload },
    /// 409
    Conflict { payload: ErrorPayload },
    /// Any other non-2xx status
    Server { status: u16, payload: ErrorPayload },
    /// 2xx with a body we could not decode
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let payload = ErrorPayload::parse(body);
        match status {
            400 => ApiError::Validation { payload },
            401 | 403 => ApiError::Unauthorized { status, payload },
            404 => ApiError::NotFound { payload },
            409 => ApiError::Conflict { payload },
            _ => ApiError::Server { status, payload },
        }
    }

    /// The parsed error body, when the server answered
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Unauthorized { payload, .. }
            | ApiError::Validation { payload }
            | ApiError::NotFound { payload }
            | ApiError::Conflict { payload }
            | ApiError::Server { payload, .. } => Some(payload),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Server { status, .. } => {
                Some(*status)
            }
            ApiError::Validation { .. } => Some(400),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// Whether the server produced a response at all
    pub fn has_response(&self) -> bool {
        self.payload().is_some()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Network error: {}", msg),
            Self::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            other => {
                let status = other.status().unwrap_or(0);
                match other.payload().and_then(ErrorPayload::flatten) {
                    Some(detail) => write!(f, "API error ({}): {}", status, detail),
                    None => write!(f, "API error ({})", status),
                }
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
