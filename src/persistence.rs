//! Persisted board layout.
//!
//! The board is stored as one JSON blob under a fixed key:
//!
//! ```json
//! { "state": { "columns": { "todo": { "id": "todo", "title": "To Do",
//!   "color": "bg-gray-100", "tasks": [{ "id": "1", "title": "A" }] } } },
//!   "version": 1 }
//! ```
//!
//! Version 0 blobs come in two shapes, both upgraded on load:
//! `{"state": {"tasks": {column: [task, ...]}}}`, which stored only task
//! lists, and `{"state": {"columns": {id: {"id", "name", "tasks": [{"id",
//! "content"}]}}}}`, which named columns `name` and tasks `content`.

use crate::{
    domain::{seed::seed_column, Board, Column, ColumnColor, ColumnId, Task, TaskId},
    error::{BoardError, Result},
    store::Snapshot,
    storage::Storage,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Layout version written by this crate
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a Board,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Deserialize)]
struct PersistedState {
    #[serde(default)]
    columns: Option<IndexMap<ColumnId, PersistedColumn>>,
    #[serde(default)]
    tasks: Option<IndexMap<ColumnId, Vec<PersistedTask>>>,
}

#[derive(Deserialize)]
struct PersistedColumn {
    #[serde(default, alias = "name")]
    title: Option<String>,
    #[serde(default)]
    color: Option<ColumnColor>,
    #[serde(default)]
    tasks: Vec<PersistedTask>,
}

#[derive(Deserialize)]
struct PersistedTask {
    id: TaskId,
    #[serde(alias = "content")]
    title: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<PersistedTask> for Task {
    fn from(task: PersistedTask) -> Self {
        Task::new(task.id, task.title, task.description)
    }
}

/// Serializes a board into the persisted layout
pub fn encode(board: &Board) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        state: board,
        version: CURRENT_VERSION,
    })?)
}

/// Parses a persisted blob. `Ok(None)` means the blob holds no board.
pub fn decode(blob: &str) -> Result<Option<Board>> {
    let envelope: Envelope = serde_json::from_str(blob)?;
    if envelope.version > CURRENT_VERSION {
        return Err(BoardError::UnsupportedVersion(envelope.version));
    }
    if envelope.version < CURRENT_VERSION {
        tracing::info!(version = envelope.version, "Upgrading board layout");
    }

    let PersistedState { columns, tasks } = envelope.state;
    let board = match (columns, tasks) {
        (Some(columns), _) => Board::from_columns(
            columns
                .into_iter()
                .enumerate()
                .map(|(n, (id, column))| restore_column(n, id, column)),
        ),
        (None, Some(tasks)) => Board::from_columns(tasks.into_iter().enumerate().map(
            |(n, (id, tasks))| {
                let column = PersistedColumn {
                    title: None,
                    color: None,
                    tasks,
                };
                restore_column(n, id, column)
            },
        )),
        (None, None) => return Ok(None),
    };

    let duplicates = board.duplicate_task_ids();
    if !duplicates.is_empty() {
        tracing::warn!(?duplicates, "Persisted board lists tasks in more than one place");
    }
    Ok(Some(board))
}

/// Builds the `n`th column under its map key, which is authoritative.
/// Missing titles and colors come from the seed for well-known keys; other
/// columns are titled after their key and colored round-robin.
fn restore_column(n: usize, id: ColumnId, column: PersistedColumn) -> Column {
    let seed = seed_column(&id);
    let title = column
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| seed.as_ref().map(|(title, _)| title.to_string()))
        .unwrap_or_else(|| id.to_string());
    let color = column
        .color
        .or_else(|| seed.map(|(_, color)| color))
        .unwrap_or_else(|| ColumnColor::round_robin(n));
    let tasks = column.tasks.into_iter().map(Task::from).collect();
    Column::new(id, title, color).with_tasks(tasks)
}

pub async fn load_board<S: Storage + ?Sized>(storage: &S, key: &str) -> Result<Option<Board>> {
    match storage.load(key).await? {
        Some(blob) => decode(&blob),
        None => Ok(None),
    }
}

pub async fn save_board<S: Storage + ?Sized>(storage: &S, key: &str, board: &Board) -> Result<()> {
    storage.save(key, &encode(board)?).await
}

/// Writes every snapshot published on `snapshots` until the store goes away.
///
/// Intermediate snapshots may be skipped when mutations outpace storage. A
/// failed write is logged and retried with the next snapshot; if the last
/// write before the store closes failed, it is retried once more and that
/// error is returned.
pub async fn mirror<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    mut snapshots: watch::Receiver<Snapshot>,
) -> Result<()> {
    let mut unsaved = false;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        match save_board(storage, key, &snapshot.board).await {
            Ok(()) => {
                unsaved = false;
                tracing::debug!(key, version = snapshot.version, "Saved board");
            }
            Err(err) => {
                unsaved = true;
                tracing::warn!(key, version = snapshot.version, error = %err, "Failed to save board");
            }
        }
    }

    if unsaved {
        let snapshot = snapshots.borrow().clone();
        save_board(storage, key, &snapshot.board).await?;
        tracing::debug!(key, version = snapshot.version, "Saved board on close");
    }
    tracing::debug!(key, "Board store closed, stopping mirror");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::seed_board, storage::MemoryStorage, store::BoardStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Storage whose first `save` fails, as a full disk would
    #[derive(Default)]
    struct FailFirstSave {
        inner: MemoryStorage,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl Storage for FailFirstSave {
        async fn load(&self, key: &str) -> Result<Option<String>> {
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, blob: &str) -> Result<()> {
            if self.saves.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.save(key, blob).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    #[test]
    fn test_encoded_layout() {
        let board = Board::from_columns(vec![Column::new(
            "todo".into(),
            "To Do",
            ColumnColor::new("bg-gray-100"),
        )
        .with_tasks(vec![Task::new("1".into(), "A", None)])]);

        let value: serde_json::Value = serde_json::from_str(&encode(&board).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["state"]["columns"]["todo"]["title"], "To Do");
        assert_eq!(value["state"]["columns"]["todo"]["color"], "bg-gray-100");
        assert_eq!(value["state"]["columns"]["todo"]["tasks"][0]["id"], "1");
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let board = seed_board()
            .add_column("Blocked", &"blocked".into())
            .unwrap();
        let decoded = decode(&encode(&board).unwrap()).unwrap().unwrap();

        let order: Vec<_> = decoded.column_ids().map(|c| c.to_string()).collect();
        assert_eq!(order, vec!["todo", "inProgress", "review", "done", "blocked"]);
        assert_eq!(decoded, board);
    }

    #[test]
    fn test_map_key_wins_over_column_id() {
        let blob = r#"{"state":{"columns":{"real":{"id":"stale","title":"R","color":"bg-blue-50","tasks":[]}}},"version":1}"#;
        let board = decode(blob).unwrap().unwrap();
        assert_eq!(board.column(&"real".into()).unwrap().id.as_str(), "real");
    }

    #[test]
    fn test_migrates_version_zero_layout() {
        let blob = r#"{
            "state": {
                "tasks": {
                    "todo": [{"id": "1", "title": "Research competitors", "description": "Analyze main competitors"}],
                    "custom": [],
                    "done": [{"id": "5", "title": "Setup project", "description": ""}]
                },
                "draggingTask": null
            },
            "version": 0
        }"#;

        let board = decode(blob).unwrap().unwrap();
        let order: Vec<_> = board.column_ids().map(|c| c.to_string()).collect();
        assert_eq!(order, vec!["todo", "custom", "done"]);

        let todo = board.column(&"todo".into()).unwrap();
        assert_eq!(todo.title, "To Do");
        assert_eq!(todo.color.as_str(), "bg-gray-100");
        assert_eq!(todo.tasks[0].title, "Research competitors");

        let custom = board.column(&"custom".into()).unwrap();
        assert_eq!(custom.title, "custom");
        assert_eq!(custom.color, ColumnColor::round_robin(1));

        let done = board.column(&"done".into()).unwrap();
        assert_eq!(done.title, "Done");
        assert!(done.tasks[0].description.is_none());
    }

    #[test]
    fn test_migrates_version_zero_named_columns() {
        let blob = r#"{
            "state": {
                "columns": {
                    "not-started": {"id": "not-started", "name": "Not started", "tasks": [
                        {"id": "1", "content": "Card 4"},
                        {"id": "2", "content": "Card 1"}
                    ]},
                    "in-progress": {"id": "in-progress", "name": "In progress", "tasks": [
                        {"id": "4", "content": "Card 2"}
                    ]},
                    "done": {"id": "done", "name": "Completed", "tasks": []}
                }
            },
            "version": 0
        }"#;

        let board = decode(blob).unwrap().unwrap();
        let order: Vec<_> = board.column_ids().map(|c| c.to_string()).collect();
        assert_eq!(order, vec!["not-started", "in-progress", "done"]);

        let not_started = board.column(&"not-started".into()).unwrap();
        assert_eq!(not_started.title, "Not started");
        assert_eq!(not_started.color, ColumnColor::round_robin(0));
        assert_eq!(not_started.tasks[1].title, "Card 1");
        assert!(not_started.tasks[1].description.is_none());

        let in_progress = board.column(&"in-progress".into()).unwrap();
        assert_eq!(in_progress.color, ColumnColor::round_robin(1));

        // Stored names win over seed titles; seed colors fill the gap.
        let done = board.column(&"done".into()).unwrap();
        assert_eq!(done.title, "Completed");
        assert_eq!(done.color.as_str(), "bg-green-50");
        assert_eq!(board.task_count(), 3);
    }

    #[test]
    fn test_rejects_future_version() {
        let blob = r#"{"state":{"columns":{}},"version":7}"#;
        assert!(matches!(decode(blob), Err(BoardError::UnsupportedVersion(7))));
    }

    #[test]
    fn test_empty_state_has_no_board() {
        assert!(decode(r#"{"state":{},"version":1}"#).unwrap().is_none());
    }

    #[test]
    fn test_garbage_is_a_serialization_error() {
        assert!(matches!(
            decode("not json"),
            Err(BoardError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = MemoryStorage::new();
        assert!(load_board(&storage, "task-storage").await.unwrap().is_none());

        let board = seed_board();
        save_board(&storage, "task-storage", &board).await.unwrap();

        let loaded = load_board(&storage, "task-storage").await.unwrap().unwrap();
        assert_eq!(loaded, board);
    }

    #[tokio::test]
    async fn test_mirror_writes_latest_snapshot() {
        let storage = MemoryStorage::new();
        let mut store = BoardStore::new();
        let snapshots = store.subscribe();

        store.add_column("Blocked", &"blocked".into());
        store.move_task(&"1".into(), &"todo".into(), &"blocked".into(), 0, 0);
        let expected = store.board().clone();
        drop(store);

        mirror(&storage, "task-storage", snapshots).await.unwrap();

        let saved = load_board(&storage, "task-storage").await.unwrap().unwrap();
        assert_eq!(saved, expected);
    }

    #[tokio::test]
    async fn test_mirror_retries_after_failed_save() {
        let storage = FailFirstSave::default();
        let mut store = BoardStore::new();
        let snapshots = store.subscribe();

        store.add_column("Blocked", &"blocked".into());
        let mirrored = mirror(&storage, "task-storage", snapshots);
        tokio::pin!(mirrored);

        // First write fails; the mirror must keep waiting for more snapshots.
        tokio::select! {
            _ = &mut mirrored => panic!("mirror stopped after a failed save"),
            _ = tokio::task::yield_now() => {}
        }
        assert!(storage.inner.load("task-storage").await.unwrap().is_none());

        store.add_column("Later", &"later".into());
        let expected = store.board().clone();
        drop(store);

        mirrored.await.unwrap();
        let saved = load_board(&storage, "task-storage").await.unwrap().unwrap();
        assert_eq!(saved, expected);
        assert!(saved.column(&"later".into()).is_some());
    }

    #[tokio::test]
    async fn test_mirror_retries_failed_save_on_close() {
        let storage = FailFirstSave::default();
        let mut store = BoardStore::new();
        let snapshots = store.subscribe();

        store.add_column("Blocked", &"blocked".into());
        let expected = store.board().clone();
        drop(store);

        mirror(&storage, "task-storage", snapshots).await.unwrap();
        let saved = load_board(&storage, "task-storage").await.unwrap().unwrap();
        assert_eq!(saved, expected);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 2);
    }
}
