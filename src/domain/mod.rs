pub mod board;
pub mod error;
pub mod sequence;

pub use board::{Board, Column, ColumnRow, Task};
pub use error::{Entity, KanbanError};
pub use sequence::TaskSequence;
