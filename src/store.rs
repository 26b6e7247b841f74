//! The board state store.
//!
//! `BoardStore` owns the current board snapshot and the drag state. Mutations
//! never fail from the caller's point of view: a request that cannot be
//! applied (blank title, unknown id, stale drag position) leaves the board as
//! it was and returns `false`/`None`. Every effective mutation bumps the
//! version and publishes the new snapshot to subscribers.

use crate::{
    config::StoreConfig,
    domain::{seed_board, Board, ColumnId, Task, TaskId, TaskLocation},
    drag::{DragController, DragState, MoveRequest},
    error::Result,
    persistence,
    storage::Storage,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable view of the board at one version
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub board: Arc<Board>,
}

impl Snapshot {
    /// True when `other` is the same published state
    pub fn same_as(&self, other: &Snapshot) -> bool {
        self.version == other.version && Arc::ptr_eq(&self.board, &other.board)
    }
}

pub struct BoardStore {
    current: Snapshot,
    drag: DragController,
    publisher: watch::Sender<Snapshot>,
}

impl BoardStore {
    /// Creates a store holding the seed board
    pub fn new() -> Self {
        Self::with_board(seed_board())
    }

    /// Creates a store holding `board` at version 0
    pub fn with_board(board: Board) -> Self {
        let current = Snapshot {
            version: 0,
            board: Arc::new(board),
        };
        let (publisher, _) = watch::channel(current.clone());
        Self {
            current,
            drag: DragController::new(),
            publisher,
        }
    }

    /// Restores the persisted board, or seeds and persists a fresh one.
    ///
    /// A blob that cannot be decoded is logged and left in place; the store
    /// starts from the seed and the blob is only replaced by the first
    /// mutation that gets saved. Storage read errors are returned.
    pub async fn open<S: Storage + ?Sized>(storage: &S, config: &StoreConfig) -> Result<Self> {
        let key = &config.storage_key;
        let restored = match storage.load(key).await? {
            Some(blob) => match persistence::decode(&blob) {
                Ok(board) => board,
                Err(err) => {
                    tracing::warn!(%key, error = %err, "Saved board is unreadable, starting from seed");
                    return Ok(Self::new());
                }
            },
            None => None,
        };

        match restored {
            Some(board) => {
                tracing::info!(
                    %key,
                    columns = board.column_count(),
                    tasks = board.task_count(),
                    "Restored board"
                );
                Ok(Self::with_board(board))
            }
            None => {
                tracing::info!(%key, "No saved board, seeding");
                let store = Self::new();
                persistence::save_board(storage, key, store.board()).await?;
                Ok(store)
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    pub fn board(&self) -> &Board {
        &self.current.board
    }

    pub fn version(&self) -> u64 {
        self.current.version
    }

    /// Receives every snapshot published after this call
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Looks a task up for the detail view (linear scan)
    pub fn find_task(&self, task_id: &TaskId) -> Option<TaskLocation<'_>> {
        self.current.board.find_task(task_id)
    }

    /// Installs a whole board, e.g. one reloaded from storage
    pub fn replace_board(&mut self, board: Board) {
        self.publish(board);
    }

    fn publish(&mut self, board: Board) {
        self.current = Snapshot {
            version: self.current.version + 1,
            board: Arc::new(board),
        };
        self.publisher.send_replace(self.current.clone());
    }

    fn apply(&mut self, operation: &'static str, result: Result<Board>) -> bool {
        match result {
            Ok(board) => {
                self.publish(board);
                true
            }
            Err(err) => {
                tracing::debug!(operation, error = %err, "Board left unchanged");
                false
            }
        }
    }

    pub fn move_task(
        &mut self,
        task_id: &TaskId,
        source_column_id: &ColumnId,
        dest_column_id: &ColumnId,
        source_index: usize,
        dest_index: usize,
    ) -> bool {
        let result = self.current.board.move_task(
            task_id,
            source_column_id,
            dest_column_id,
            source_index,
            dest_index,
        );
        self.apply("move_task", result)
    }

    /// Appends a new task and returns its generated id
    pub fn add_task(
        &mut self,
        column_id: &ColumnId,
        title: &str,
        description: Option<&str>,
    ) -> Option<TaskId> {
        let board = &self.current.board;
        let mut id = TaskId::generate();
        while board.contains_task(&id) {
            id = TaskId::generate();
        }

        let task = Task::new(id.clone(), title.trim(), description.map(str::to_string));
        let result = board.add_task(column_id, task);
        self.apply("add_task", result).then_some(id)
    }

    pub fn delete_task(&mut self, task_id: &TaskId, column_id: &ColumnId) -> bool {
        let result = self.current.board.delete_task(task_id, column_id);
        self.apply("delete_task", result)
    }

    pub fn update_task(
        &mut self,
        task_id: &TaskId,
        column_id: &ColumnId,
        title: &str,
        description: Option<&str>,
    ) -> bool {
        let result = self.current.board.update_task(
            task_id,
            column_id,
            title.trim(),
            description.map(str::to_string),
        );
        self.apply("update_task", result)
    }

    /// Adds an empty column. An id already on the board is left alone.
    pub fn add_column(&mut self, title: &str, column_id: &ColumnId) -> bool {
        let result = self.current.board.add_column(title, column_id);
        self.apply("add_column", result)
    }

    /// Adds a column whose id is derived from its title
    pub fn add_stage(&mut self, title: &str) -> Option<ColumnId> {
        let column_id = ColumnId::from_title(title);
        self.add_column(title, &column_id).then_some(column_id)
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn start_drag(&mut self, task_id: TaskId, source_column_id: ColumnId, source_index: usize) {
        self.drag.start(task_id, source_column_id, source_index);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Finishes the active drag on a column slot. Returns whether the board
    /// changed; dropping with no active drag does nothing.
    pub fn drop_on(&mut self, dest_column_id: ColumnId, dest_index: usize) -> bool {
        let Some(request) = self.drag.take_drop(dest_column_id, dest_index) else {
            tracing::debug!("Drop without an active drag");
            return false;
        };
        self.apply_move(request)
    }

    fn apply_move(&mut self, request: MoveRequest) -> bool {
        self.move_task(
            &request.task_id,
            &request.source_column_id,
            &request.dest_column_id,
            request.source_index,
            request.dest_index,
        )
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}
