use serde::{Deserialize, Serialize};

/// A non-fatal problem recorded while a stage processed one task
///
/// Stages never fail a batch; anything a stage cannot resolve becomes a
/// diagnostic and processing continues with the field left at its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub task_id: Option<u32>,
    pub stage: String,
    pub message: String,
}

impl Diagnostic {
    pub fn for_task(task_id: u32, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id),
            stage: stage.into(),
            message: message.into(),
        }
    }
}
