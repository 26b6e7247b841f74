use crate::domain::{
    board::Board,
    column::{Column, ColumnId},
    palette::ColumnColor,
    task::{Task, TaskId},
};

/// Column keys, titles and colors of a freshly seeded board, in display order
pub const SEED_COLUMNS: &[(&str, &str, &str)] = &[
    ("todo", "To Do", "bg-gray-100"),
    ("inProgress", "In Progress", "bg-blue-50"),
    ("review", "Review", "bg-yellow-50"),
    ("done", "Done", "bg-green-50"),
];

/// Looks up the seed title and color for a well-known column key
pub fn seed_column(id: &ColumnId) -> Option<(&'static str, ColumnColor)> {
    SEED_COLUMNS
        .iter()
        .find(|(key, _, _)| *key == id.as_str())
        .map(|(_, title, color)| (*title, ColumnColor::new(*color)))
}

fn seed_task(id: &str, title: &str, description: &str) -> Task {
    Task::new(TaskId::new(id), title, Some(description.to_string()))
}

/// The board shown on first launch, before anything has been persisted
pub fn seed_board() -> Board {
    let mut tasks = vec![
        vec![
            seed_task("1", "Research competitors", "Analyze main competitors"),
            seed_task("2", "Design mockups", "Create initial designs"),
        ],
        vec![seed_task("3", "Update documentation", "Review and update docs")],
        vec![seed_task("4", "Code review", "Review PR #123")],
        vec![seed_task("5", "Setup project", "Initial project setup")],
    ]
    .into_iter();

    Board::from_columns(SEED_COLUMNS.iter().map(|(id, title, color)| {
        Column::new(ColumnId::new(*id), *title, ColumnColor::new(*color))
            .with_tasks(tasks.next().unwrap_or_default())
    }))
}
