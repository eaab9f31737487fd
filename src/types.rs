use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Normalized (trimmed, lower-cased) skill tokens.
pub type SkillSet = BTreeSet<String>;

/// Fallback value for any field the markup did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Student,
    Opportunity,
}

impl EntityType {
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Student => "students",
            EntityType::Opportunity => "opportunities",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudentRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Skills", with = "skill_column")]
    pub skills: SkillSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum WorkMode {
    Remote,
    #[serde(rename = "In-office")]
    InOffice,
    Hybrid,
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkMode::Remote => "Remote",
            WorkMode::InOffice => "In-office",
            WorkMode::Hybrid => "Hybrid",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for WorkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(WorkMode::Remote),
            "in-office" | "inoffice" | "in_office" | "office" => Ok(WorkMode::InOffice),
            "hybrid" => Ok(WorkMode::Hybrid),
            other => Err(format!(
                "unknown mode '{}' (expected Remote, In-office or Hybrid)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OpportunityRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Requirements")]
    pub requirements: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Mode")]
    pub mode: WorkMode,
}

/// One opportunity with its skill-overlap score. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub opportunity: OpportunityRecord,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    InvalidListingUrl,
    ListingFetchFailed,
    NoEntries,
    MissingDetailLink,
    InvalidDetailLink,
    DetailFetchFailed,
}

/// Why an entry (or the whole listing) produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDiagnostic {
    pub kind: DiagnosticKind,
    /// 1-based position of the entry in document order; `None` for listing-level problems.
    pub entry: Option<usize>,
    pub message: String,
}

impl EntryDiagnostic {
    pub fn listing(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            entry: None,
            message: message.into(),
        }
    }

    pub fn entry(kind: DiagnosticKind, entry: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            entry: Some(entry),
            message: message.into(),
        }
    }
}

impl fmt::Display for EntryDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry {
            Some(index) => write!(f, "entry {}: {}", index, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of one `extract` call: records in document order plus anything skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub records: Vec<OpportunityRecord>,
    pub diagnostics: Vec<EntryDiagnostic>,
}

impl Extraction {
    pub fn failed(diagnostic: EntryDiagnostic) -> Self {
        Self {
            records: vec![],
            diagnostics: vec![diagnostic],
        }
    }
}

/// Persisted as a single comma-joined `Skills` column.
mod skill_column {
    use super::SkillSet;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(skills: &SkillSet, serializer: S) -> Result<S::Ok, S::Error> {
        let joined = skills.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SkillSet, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(crate::normalize::parse_skills(&raw))
    }
}
