use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// One member of the team roster. Names are the unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub skills: Vec<String>,
}

/// An immutable roster snapshot, taken once at the start of a batch
///
/// The member order is the file order and is the final tie-break for
/// workload-balanced assignment, so it must stay stable for a whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub members: Vec<TeamMember>,
}

impl Roster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Look up a member by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&TeamMember> {
        let name_norm = normalize(name);
        self.members.iter().find(|m| normalize(&m.name) == name_norm)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            TeamMember {
                name: "John".to_string(),
                role: "Developer".to_string(),
                skills: vec!["auth".to_string()],
            },
            TeamMember {
                name: "Sarah".to_string(),
                role: "QA".to_string(),
                skills: vec!["testing".to_string()],
            },
        ])
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let roster = roster();
        assert!(roster.contains("john"));
        assert!(roster.contains("SARAH"));
        assert!(!roster.contains("dave"));
    }

    #[test]
    fn test_get_returns_member() {
        let roster = roster();
        assert_eq!(roster.get("sarah").map(|m| m.role.as_str()), Some("QA"));
    }
}
