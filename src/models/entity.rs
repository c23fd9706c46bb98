use serde::{Deserialize, Serialize};

/// Categories of entities recognized in a task's context window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    TechnicalTerm,
    TimeExpression,
}

/// A recognized entity, anchored to the sentence it was found in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub text: String,
    pub sentence_index: usize,
}

impl Entity {
    pub fn new(kind: EntityKind, text: impl Into<String>, sentence_index: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            sentence_index,
        }
    }
}
