use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured review returned by `POST /api/review` and `POST /api/review/file`.
///
/// Immutable once received. `session_id` is only present when the service
/// persisted the review server-side (authenticated requests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub score: u8, // 0..=10
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Output of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub code: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub language: String,
}

/// A `ReviewResult` annotated with a local id and timestamp for the history list.
///
/// Serialized flat (the review fields sit next to `id` and `timestamp`) so the
/// persisted JSON array reads like a list of reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReview {
    #[serde(flatten)]
    pub review: ReviewResult,
    pub id: String,     // epoch millis as decimal text
    pub timestamp: i64, // epoch millis
}

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a follow-up conversation about a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub code: String,
    pub review_context: String,
    pub messages: Vec<ChatMessage>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}

/// Row of `GET /api/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub message_count: u32,
}

/// Body of `GET /api/sessions/{id}`.
///
/// Older sessions may lack review fields; [`SessionDetail::review`] fills the gaps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDetail {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub review_context: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub created_at: String,
}

impl SessionDetail {
    /// Rebuilds the review shown for a server session.
    pub fn review(&self) -> ReviewResult {
        let reasoning = self
            .reasoning
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| self.review_context.clone().filter(|r| !r.is_empty()))
            .unwrap_or_else(|| "No detailed reasoning available.".to_owned());
        ReviewResult {
            score: self.score.unwrap_or(0),
            issues: self.issues.clone(),
            suggestions: self.suggestions.clone(),
            reasoning,
            language: self.language.clone().unwrap_or_else(|| "javascript".to_owned()),
            session_id: Some(self.id.clone()),
        }
    }
}

/// Response of the sign-in and sign-up endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
}

/// Body of `GET /api/users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body of `PUT /api/users/me`. Absent fields are left unchanged by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.username.is_none() && self.avatar_url.is_none()
    }
}

/// Signed parameters for a direct image upload, from `GET /api/users/cloudinary/signature`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSignature {
    pub api_key: String,
    pub timestamp: i64,
    pub signature: String,
    pub folder: String,
    pub cloud_name: String,
}

/// Languages offered by the selector and inferred from file extensions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    JavaScript,
    TypeScript,
    Python,
    Html,
    Css,
    Json,
    C,
    Cpp,
    Php,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Html,
        Language::Css,
        Language::Json,
        Language::C,
        Language::Cpp,
        Language::Php,
    ];

    /// Wire tag sent to the service, e.g. `"typescript"`.
    pub fn id(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Php => "php",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Json => "JSON",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Php => "PHP",
        }
    }

    /// Parses a wire tag. Unknown tags return `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.id() == id)
    }

    /// Maps a file extension (with or without the leading dot) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "js" => Some(Language::JavaScript),
            "ts" => Some(Language::TypeScript),
            "py" => Some(Language::Python),
            "html" => Some(Language::Html),
            "css" => Some(Language::Css),
            "json" => Some(Language::Json),
            "c" => Some(Language::C),
            "cpp" => Some(Language::Cpp),
            "php" => Some(Language::Php),
            _ => None,
        }
    }

    /// Next entry of the selector, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
