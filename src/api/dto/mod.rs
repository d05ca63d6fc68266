pub mod tasks;

pub use tasks::{
    BoardView, ColumnView, CreateTaskRequest, MoveTaskRequest, MoveTaskResponse, UpdateTaskRequest,
};
