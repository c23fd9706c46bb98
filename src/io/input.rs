use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::models::Roster;
use crate::text::normalize;

/// Roster loading failures. An empty member list is deliberately not one of
/// them: the pipeline handles an empty roster by leaving tasks unassigned.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse roster file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate team member name {0:?}")]
    DuplicateName(String),
}

/// Load a roster snapshot from a JSON file of the form
/// `{"members": [{"name", "role", "skills"}]}`
pub fn load_roster_file(path: &Path) -> Result<Roster, RosterError> {
    let content = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let roster: Roster = serde_json::from_str(&content).map_err(|source| RosterError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    check_unique_names(&roster)?;
    Ok(roster)
}

/// Member names are the unique key for assignment and validation
fn check_unique_names(roster: &Roster) -> Result<(), RosterError> {
    let mut seen = Vec::new();
    for member in &roster.members {
        let name_norm = normalize(&member.name);
        if seen.contains(&name_norm) {
            return Err(RosterError::DuplicateName(member.name.clone()));
        }
        seen.push(name_norm);
    }
    Ok(())
}

/// Read a plain-text transcript file
pub fn read_transcript(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read transcript: {:?}", path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_roster_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"members": [
                {{"name": "John", "role": "Developer", "skills": ["auth"]}},
                {{"name": "Sarah", "role": "QA", "skills": ["testing"]}}
            ]}}"#
        )
        .unwrap();

        let roster = load_roster_file(file.path()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.members[0].name, "John");
    }

    #[test]
    fn test_empty_roster_is_not_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"members": []}}"#).unwrap();
        let roster = load_roster_file(file.path()).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"members": [
                {{"name": "John", "role": "Developer", "skills": []}},
                {{"name": "john", "role": "QA", "skills": []}}
            ]}}"#
        )
        .unwrap();

        let err = load_roster_file(file.path()).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateName(_)));
    }

    #[test]
    fn test_malformed_roster_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not a roster").unwrap();
        let err = load_roster_file(file.path()).unwrap_err();
        assert!(matches!(err, RosterError::Parse { .. }));
    }
}
