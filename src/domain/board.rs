use crate::{
    domain::{
        column::{Column, ColumnId},
        palette::ColumnColor,
        task::{is_valid_title, Task, TaskId},
    },
    error::{BoardError, Result},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc};

/// Where a task lives on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation<'a> {
    pub column_id: &'a ColumnId,
    pub index: usize,
    pub task: &'a Task,
}

/// Immutable kanban board value.
///
/// Columns are kept in insertion order, which is also display order. Every
/// transformation returns a new `Board`; columns it does not touch are shared
/// with the original through their `Arc`, so `Arc::ptr_eq` tells a renderer
/// which columns actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    columns: IndexMap<ColumnId, Arc<Column>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from columns in display order. A later column with a
    /// repeated id replaces the earlier one in place.
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|c| (c.id.clone(), Arc::new(c)))
                .collect(),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values().map(|c| c.as_ref())
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.keys()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id).map(|c| c.as_ref())
    }

    /// Shared handle to a column, for identity comparison across snapshots
    pub fn column_arc(&self, id: &ColumnId) -> Option<&Arc<Column>> {
        self.columns.get(id)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn task_count(&self) -> usize {
        self.columns.values().map(|c| c.tasks.len()).sum()
    }

    /// Finds a task anywhere on the board.
    ///
    /// This is a linear scan over every column, O(total tasks). Boards are
    /// small enough that an id index is not worth maintaining.
    pub fn find_task(&self, task_id: &TaskId) -> Option<TaskLocation<'_>> {
        self.columns.iter().find_map(|(column_id, column)| {
            column
                .tasks
                .iter()
                .enumerate()
                .find(|(_, t)| &t.id == task_id)
                .map(|(index, task)| TaskLocation {
                    column_id,
                    index,
                    task,
                })
        })
    }

    pub fn contains_task(&self, task_id: &TaskId) -> bool {
        self.find_task(task_id).is_some()
    }

    /// Task ids that appear more than once across the board
    pub fn duplicate_task_ids(&self) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for task in self.columns.values().flat_map(|c| c.tasks.iter()) {
            if !seen.insert(&task.id) && !duplicates.contains(&task.id) {
                duplicates.push(task.id.clone());
            }
        }
        duplicates
    }

    fn require_column(&self, id: &ColumnId) -> Result<&Arc<Column>> {
        self.columns
            .get(id)
            .ok_or_else(|| BoardError::ColumnNotFound(id.to_string()))
    }

    fn with_column(&self, column: Column) -> Self {
        let mut columns = self.columns.clone();
        columns.insert(column.id.clone(), Arc::new(column));
        Self { columns }
    }

    /// Moves the task at `source_index` of `source` to `dest_index` of `dest`.
    ///
    /// `dest_index` is clamped to the destination length after the task has
    /// been removed, so dropping past the end appends. Moving within a single
    /// column reorders it. The task found at `source_index` must be
    /// `task_id`; anything else means the caller's view of the board is stale.
    pub fn move_task(
        &self,
        task_id: &TaskId,
        source: &ColumnId,
        dest: &ColumnId,
        source_index: usize,
        dest_index: usize,
    ) -> Result<Self> {
        let source_column = self.require_column(source)?;
        let dest_column = self.require_column(dest)?;

        if source == dest && source_index == dest_index {
            return Err(BoardError::NoChange);
        }

        match source_column.tasks.get(source_index) {
            Some(task) if &task.id == task_id => {}
            _ => {
                return Err(BoardError::StaleTaskPosition {
                    task: task_id.to_string(),
                    column: source.to_string(),
                    index: source_index,
                })
            }
        }

        let mut source_tasks = source_column.tasks.clone();
        let task = source_tasks.remove(source_index);

        if source == dest {
            let at = dest_index.min(source_tasks.len());
            if at == source_index {
                return Err(BoardError::NoChange);
            }
            source_tasks.insert(at, task);
            return Ok(self.with_column(source_column.replace_tasks(source_tasks)));
        }

        let mut dest_tasks = dest_column.tasks.clone();
        let at = dest_index.min(dest_tasks.len());
        dest_tasks.insert(at, task);

        let mut columns = self.columns.clone();
        columns.insert(
            source.clone(),
            Arc::new(source_column.replace_tasks(source_tasks)),
        );
        columns.insert(dest.clone(), Arc::new(dest_column.replace_tasks(dest_tasks)));
        Ok(Self { columns })
    }

    /// Appends `task` to the end of a column.
    ///
    /// Fails if the title is blank, the column is unknown or the task id is
    /// already on the board.
    pub fn add_task(&self, column_id: &ColumnId, task: Task) -> Result<Self> {
        if !is_valid_title(&task.title) {
            return Err(BoardError::EmptyTitle);
        }
        let column = self.require_column(column_id)?;
        if self.contains_task(&task.id) {
            return Err(BoardError::NoChange);
        }

        let mut updated = Column::clone(column);
        updated.tasks.push(task);
        Ok(self.with_column(updated))
    }

    /// Removes a task from the given column
    pub fn delete_task(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Self> {
        let column = self.require_column(column_id)?;
        let position = column
            .position_of(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;

        let mut updated = Column::clone(column);
        updated.tasks.remove(position);
        Ok(self.with_column(updated))
    }

    /// Replaces a task's title and description, keeping its position
    pub fn update_task(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        title: &str,
        description: Option<String>,
    ) -> Result<Self> {
        if !is_valid_title(title) {
            return Err(BoardError::EmptyTitle);
        }
        let column = self.require_column(column_id)?;
        let position = column
            .position_of(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;

        let replacement = column.tasks[position].with_details(title, description);
        if replacement == column.tasks[position] {
            return Err(BoardError::NoChange);
        }

        let mut updated = Column::clone(column);
        updated.tasks[position] = replacement;
        Ok(self.with_column(updated))
    }

    /// Appends an empty column with a palette color chosen round-robin.
    ///
    /// An existing `column_id` is never overwritten.
    pub fn add_column(&self, title: &str, column_id: &ColumnId) -> Result<Self> {
        if !is_valid_title(title) || column_id.as_str().trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        if self.columns.contains_key(column_id) {
            return Err(BoardError::ColumnExists(column_id.to_string()));
        }

        let color = ColumnColor::round_robin(self.columns.len());
        Ok(self.with_column(Column::new(column_id.clone(), title.trim(), color)))
    }
}
