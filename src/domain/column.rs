use crate::domain::{palette::ColumnColor, task::Task, task::TaskId};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Key of a column on the board (e.g. `todo`, `in-progress`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a column key from a display title: lower-cased, with runs of
    /// whitespace collapsed to a single `-`.
    pub fn from_title(title: &str) -> Self {
        let slug = title
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ColumnId {
    type Err = crate::error::BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::error::BoardError::InvalidId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A named, ordered bucket of tasks representing one workflow stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub color: ColumnColor,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn new(id: ColumnId, title: impl Into<String>, color: ColumnColor) -> Self {
        Self {
            id,
            title: title.into(),
            color,
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Copies this column's metadata around a new task list
    pub fn replace_tasks(&self, tasks: Vec<Task>) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            color: self.color.clone(),
            tasks,
        }
    }

    /// Position of a task in this column
    pub fn position_of(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == task_id)
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.position_of(task_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
