//! Drag-and-drop interaction state.
//!
//! A drag gesture starts on a task and ends with a drop on a column slot or a
//! cancel. The controller only remembers where the gesture started; turning
//! the drop into a board change is the store's job.

use crate::domain::{ColumnId, TaskId};

/// Transient drag state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: TaskId,
        source_column_id: ColumnId,
        source_index: usize,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// A completed drop, ready to be applied to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub task_id: TaskId,
    pub source_column_id: ColumnId,
    pub dest_column_id: ColumnId,
    pub source_index: usize,
    pub dest_index: usize,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Begins dragging a task. A drag already in progress is replaced; there
    /// is only ever one pointer.
    pub fn start(&mut self, task_id: TaskId, source_column_id: ColumnId, source_index: usize) {
        if let DragState::Dragging { task_id: prev, .. } = &self.state {
            tracing::debug!(previous = %prev, next = %task_id, "Replacing active drag");
        }
        self.state = DragState::Dragging {
            task_id,
            source_column_id,
            source_index,
        };
    }

    /// Abandons the current drag, if any
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Ends the drag on `dest_column_id` at `dest_index`.
    ///
    /// Returns the move to perform, or `None` when nothing was being dragged.
    /// The controller is Idle afterwards either way.
    pub fn take_drop(&mut self, dest_column_id: ColumnId, dest_index: usize) -> Option<MoveRequest> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging {
                task_id,
                source_column_id,
                source_index,
            } => Some(MoveRequest {
                task_id,
                source_column_id,
                dest_column_id,
                source_index,
                dest_index,
            }),
        }
    }
}
