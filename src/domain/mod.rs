pub mod board;
pub mod column;
pub mod palette;
pub mod seed;
pub mod task;

pub use board::{Board, TaskLocation};
pub use column::{Column, ColumnId};
pub use palette::ColumnColor;
pub use seed::seed_board;
pub use task::{Task, TaskId};
