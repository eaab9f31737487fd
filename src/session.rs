//! Orchestration behind the CLI: validate input, extract, persist, rank.

use thiserror::Error;
use tracing::info;

use crate::error::{MatchError, StorageError};
use crate::extractor::Extractor;
use crate::fetch::PageFetcher;
use crate::matcher::rank;
use crate::normalize::parse_skills;
use crate::storage::RecordStore;
use crate::types::{Extraction, MatchResult, OpportunityRecord, StudentRecord, WorkMode};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("a student named '{0}' already exists")]
    DuplicateStudent(String),

    #[error("no student named '{0}'")]
    UnknownStudent(String),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Extraction succeeded but persisting it did not; the records are kept for a retry.
    #[error("fetched {} records but could not save them: {source}", .extraction.records.len())]
    ImportNotSaved {
        extraction: Extraction,
        #[source]
        source: StorageError,
    },
}

pub fn add_student<S: RecordStore>(
    store: &mut S,
    name: &str,
    skills: &str,
) -> Result<StudentRecord, SessionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SessionError::MissingField { field: "name" });
    }

    let skills = parse_skills(skills);
    if skills.is_empty() {
        return Err(SessionError::MissingField { field: "skills" });
    }

    let existing: Vec<StudentRecord> = store.read_all();
    if existing.iter().any(|s| s.name == name) {
        return Err(SessionError::DuplicateStudent(name.to_string()));
    }

    let student = StudentRecord {
        name: name.to_string(),
        skills,
    };
    store.append_all(std::slice::from_ref(&student))?;
    Ok(student)
}

pub fn add_opportunity<S: RecordStore>(
    store: &mut S,
    title: &str,
    requirements: &str,
    location: &str,
    mode: WorkMode,
) -> Result<OpportunityRecord, SessionError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SessionError::MissingField { field: "title" });
    }
    let requirements = requirements.trim();
    if requirements.is_empty() {
        return Err(SessionError::MissingField {
            field: "requirements",
        });
    }

    let opportunity = OpportunityRecord {
        title: title.to_string(),
        requirements: requirements.to_string(),
        location: location.trim().to_string(),
        mode,
    };
    store.append_all(std::slice::from_ref(&opportunity))?;
    Ok(opportunity)
}

/// Extract a listing and append everything found in one call.
pub fn import_listing<S: RecordStore, F: PageFetcher>(
    store: &mut S,
    extractor: &Extractor<F>,
    url: &str,
) -> Result<Extraction, SessionError> {
    let extraction = extractor.extract(url);

    if extraction.records.is_empty() {
        return Ok(extraction);
    }

    if let Err(source) = store.append_all(&extraction.records) {
        return Err(SessionError::ImportNotSaved { extraction, source });
    }

    info!("Saved {} opportunities from {}", extraction.records.len(), url);
    Ok(extraction)
}

pub fn recommend<S: RecordStore>(
    store: &S,
    student_name: &str,
    limit: usize,
) -> Result<Vec<MatchResult>, SessionError> {
    let student_name = student_name.trim();
    let student = store
        .read_all::<StudentRecord>()
        .into_iter()
        .find(|s| s.name == student_name)
        .ok_or_else(|| SessionError::UnknownStudent(student_name.to_string()))?;

    let opportunities: Vec<OpportunityRecord> = store.read_all();
    Ok(rank(&student.skills, &opportunities, limit)?)
}
