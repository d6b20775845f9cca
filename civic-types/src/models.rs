use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{
    ContentKind, JurisdictionLevel, OfficeCategory, Verdict, VoteDirection, VoteTransition,
};

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

/// Administrative region (state or district), keyed by `code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub group: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

/// Government office type, keyed by `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    pub category: OfficeCategory,
    pub level: JurisdictionLevel,
    pub description: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

/// Account as exposed over the API. The credential hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: Uuid,
    pub item_kind: ContentKind,
    pub item_id: String,
    pub direction: VoteDirection,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A published fact-check entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheck {
    pub id: String,
    pub claim: String,
    #[serde(default)]
    pub claimant: Option<String>,
    pub verdict: Verdict,
    pub summary: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(with = "datetime_format")]
    pub published_at: DateTime<Utc>,
}

/// AI analysis of a single claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub verdict: Verdict,
    /// Confidence as a percentage, 0 to 100
    pub confidence: u8,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCategory {
    pub name: String,
    /// Score out of 100
    pub score: f64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Politician score breakdown returned by the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub politician_id: String,
    pub politician_name: String,
    pub overall_score: f64,
    #[serde(default)]
    pub categories: Vec<ScoreCategory>,
    #[serde(default)]
    pub summary: Option<String>,
}

// Request/Response types for API
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub session_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub item_kind: ContentKind,
    pub item_id: String,
    pub transition: VoteTransition,
    pub direction: VoteDirection,
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyResponse {
    pub item_kind: ContentKind,
    pub item_id: String,
    pub upvotes: i64,
    pub downvotes: i64,
    /// Caller's own vote, when a valid session was presented
    #[serde(default)]
    pub user_vote: Option<VoteDirection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FactCheckRequest {
    pub claim: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
