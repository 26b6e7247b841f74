use crate::{domain::TaskId, error::BoardError};
use std::{fmt, str::FromStr};

/// The two views a client can navigate to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Board,
    /// `/<task-id>`
    Task(TaskId),
}

impl Route {
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Route {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        if path.is_empty() || path == "/" {
            return Ok(Self::Board);
        }

        let segment = path
            .strip_prefix('/')
            .ok_or_else(|| BoardError::InvalidRoute(s.to_string()))?;
        let segment = segment.strip_suffix('/').unwrap_or(segment);
        if segment.is_empty() {
            return Err(BoardError::InvalidRoute(s.to_string()));
        }

        segment
            .parse::<TaskId>()
            .map(Self::Task)
            .map_err(|_| BoardError::InvalidRoute(s.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => write!(f, "/"),
            Self::Task(id) => write!(f, "/{}", id),
        }
    }
}
