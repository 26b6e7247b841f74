//! # Taskboard Core
//!
//! Board state for a kanban task board: columns of ordered tasks, the
//! operations that move and edit them, drag-and-drop state, and the JSON
//! snapshot that mirrors the board to storage.
//!
//! Rendering and navigation live in the host application, which reads
//! [`Snapshot`]s from a [`BoardStore`] and calls its operations.

pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod persistence;
pub mod route;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::StoreConfig;
pub use domain::{
    board::{Board, TaskLocation},
    column::{Column, ColumnId},
    palette::ColumnColor,
    task::{Task, TaskId},
};
pub use drag::{DragController, DragState, MoveRequest};
pub use error::{BoardError, Result};
pub use route::Route;
pub use storage::Storage;
pub use store::{BoardStore, Snapshot};
