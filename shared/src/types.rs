//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Stable identity of an investor record
///
/// Opaque string: imported records use `investor-<millis>-<index>`, records
/// created on the board use a v4 UUID. Never reassigned once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for records created in this session
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Key of a board document in the remote JSON store
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Parse a user-supplied identifier, rejecting blank input
    pub fn parse(input: &str) -> SharedResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SharedError::InvalidProjectId {
                input: input.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse an optional identifier, treating blank input as absent
    pub fn from_optional(input: Option<&str>) -> Option<Self> {
        input.and_then(|value| Self::parse(value).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage of an investor; also the board column it is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestorStatus {
    #[serde(rename = "Da contattare")]
    ToContact,
    #[serde(rename = "Contattati")]
    Contacted,
    #[serde(rename = "Interessati")]
    Interested,
    #[serde(rename = "Negoziazione")]
    Negotiation,
    #[serde(rename = "A bordo!")]
    Onboarded,
    #[serde(rename = "Drop definitivo")]
    Dropped,
}

impl InvestorStatus {
    /// All stages in pipeline (column) order
    pub const ALL: [InvestorStatus; 6] = [
        InvestorStatus::ToContact,
        InvestorStatus::Contacted,
        InvestorStatus::Interested,
        InvestorStatus::Negotiation,
        InvestorStatus::Onboarded,
        InvestorStatus::Dropped,
    ];

    /// Stage assigned to imported records and records missing a status
    pub const fn first() -> Self {
        InvestorStatus::ToContact
    }

    /// Terminal stage targeted by the delete zone
    pub const fn terminal() -> Self {
        InvestorStatus::Dropped
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvestorStatus::Dropped)
    }

    /// Label as stored remotely and shown as the column title
    pub fn label(&self) -> &'static str {
        match self {
            InvestorStatus::ToContact => "Da contattare",
            InvestorStatus::Contacted => "Contattati",
            InvestorStatus::Interested => "Interessati",
            InvestorStatus::Negotiation => "Negoziazione",
            InvestorStatus::Onboarded => "A bordo!",
            InvestorStatus::Dropped => "Drop definitivo",
        }
    }
}

impl fmt::Display for InvestorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for InvestorStatus {
    type Err = SharedError;

    /// Accepts the stored label, or a case-insensitive English alias
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(status) = Self::ALL.iter().find(|status| status.label() == s) {
            return Ok(*status);
        }
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "to_contact" | "da_contattare" => Ok(InvestorStatus::ToContact),
            "contacted" | "contattati" => Ok(InvestorStatus::Contacted),
            "interested" | "interessati" => Ok(InvestorStatus::Interested),
            "negotiation" | "negoziazione" => Ok(InvestorStatus::Negotiation),
            "onboarded" | "a_bordo" | "a_bordo!" => Ok(InvestorStatus::Onboarded),
            "dropped" | "drop" | "drop_definitivo" => Ok(InvestorStatus::Dropped),
            _ => Err(SharedError::UnknownStatus {
                input: s.to_string(),
            }),
        }
    }
}

/// An investor opportunity tracked on the board
///
/// Persisted form always carries every string field (empty string when
/// absent); the investment bounds are omitted when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub status: InvestorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_max: Option<f64>,
    /// ISO-8601 creation timestamp, kept verbatim as received
    pub created_at: String,
    pub email: String,
    pub linkedin: String,
}

impl Investor {
    /// Record with the given identity and name, every other field empty
    pub fn new(id: RecordId, name: impl Into<String>, status: InvestorStatus, created_at: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: String::new(),
            description: String::new(),
            status,
            investment_min: None,
            investment_max: None,
            created_at: created_at.into(),
            email: String::new(),
            linkedin: String::new(),
        }
    }
}

/// Current time formatted the way records store `createdAt`
pub fn timestamp_now() -> String {
    format_timestamp(chrono::Utc::now())
}

pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
