//! Board API Contract
//!
//! Remote collaborator the reconciler talks to. Implemented over HTTP in
//! the browser client and in memory for offline mode and tests.

use async_trait::async_trait;

use crate::error::BoardResult;
use crate::models::{BoardDetails, Column, ColumnPatch, NewColumn, NewTask, Task, TaskDestination, TaskPatch};

#[async_trait(?Send)]
pub trait BoardApi {
    /// Full board with columns and embedded tasks
    async fn get_board_details(&self, board_id: &str) -> BoardResult<BoardDetails>;

    async fn create_column(&self, column: NewColumn) -> BoardResult<Column>;

    /// Position changes cascade to sibling columns server-side
    async fn update_column(&self, column_id: &str, patch: ColumnPatch) -> BoardResult<Column>;

    async fn delete_column(&self, column_id: &str) -> BoardResult<()>;

    async fn create_task(&self, task: NewTask) -> BoardResult<Task>;

    async fn update_task(&self, task_id: &str, patch: TaskPatch) -> BoardResult<Task>;

    /// Relocate a task; siblings in both columns are shifted server-side
    async fn move_task(&self, task_id: &str, destination: TaskDestination) -> BoardResult<Task>;

    async fn delete_task(&self, task_id: &str) -> BoardResult<()>;
}
