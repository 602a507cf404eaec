//! In-Memory Board API
//!
//! A [`BoardApi`] holding a single board in process memory, with the same
//! sibling cascades the server applies. Backs the client's offline mode and
//! the reconciler tests. Every call is logged; a failure can be queued for
//! the next call.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use chrono::Utc;

use crate::api::BoardApi;
use crate::error::{BoardError, BoardResult};
use crate::models::{
    Board, BoardDetails, Column, ColumnPatch, ColumnWithTasks, NewColumn, NewTask, Priority, Task, TaskDestination,
    TaskPatch,
};
use crate::store::BoardState;

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetBoardDetails(String),
    CreateColumn(NewColumn),
    UpdateColumn(String, ColumnPatch),
    DeleteColumn(String),
    CreateTask(NewTask),
    UpdateTask(String, TaskPatch),
    MoveTask(String, TaskDestination),
    DeleteTask(String),
}

impl ApiCall {
    /// Whether the call changes server state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ApiCall::GetBoardDetails(_))
    }
}

pub struct InMemoryBoardApi {
    state: RefCell<BoardState>,
    calls: RefCell<Vec<ApiCall>>,
    failure: RefCell<Option<BoardError>>,
    next_id: Cell<u64>,
}

impl InMemoryBoardApi {
    pub fn new(board: Board) -> Self {
        let state = BoardState {
            board: Some(board),
            ..Default::default()
        };
        Self::from_state(state)
    }

    pub fn from_details(details: BoardDetails) -> Self {
        let mut state = BoardState::default();
        state.apply_details(details);
        Self::from_state(state)
    }

    /// A small demo board for offline use
    pub fn seeded(board_id: &str) -> Self {
        let now = Utc::now();
        let api = Self::new(Board {
            id: board_id.to_string(),
            title: "Taskwave".to_string(),
            description: Some("Offline board".to_string()),
            background_color: Some("#3498db".to_string()),
            created_at: now,
            updated_at: Some(now),
        });
        {
            let mut state = api.state.borrow_mut();
            for (position, title) in ["Todo", "In progress", "Done"].into_iter().enumerate() {
                let id = api.allocate_id("col");
                state.insert_column(Column::new(id, board_id, title, position as i32 + 1));
            }
            let todo = state.columns[0].id.clone();
            let doing = state.columns[1].id.clone();
            let seeds = [
                (todo.as_str(), "Implement drag and drop", Priority::High),
                (todo.as_str(), "Fix mobile layout", Priority::Urgent),
                (doing.as_str(), "Add theme support", Priority::Normal),
            ];
            for (column_id, title, priority) in seeds {
                let position = state.next_task_position(column_id);
                let mut task = Task::new(api.allocate_id("task"), column_id, title, position);
                task.priority = priority;
                state.insert_task(task);
            }
        }
        api
    }

    fn from_state(state: BoardState) -> Self {
        let next_id = (state.columns.len() + state.tasks.len()) as u64 + 1;
        Self {
            state: RefCell::new(state),
            calls: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            next_id: Cell::new(next_id),
        }
    }

    /// Fail the next call with `error`, leaving state untouched
    pub fn fail_next(&self, error: BoardError) {
        self.failure.replace(Some(error));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    pub fn mutation_calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().iter().filter(|call| call.is_mutation()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Current server-side view
    pub fn details(&self) -> BoardResult<BoardDetails> {
        let state = self.state.borrow();
        let board = state
            .board
            .clone()
            .ok_or_else(|| BoardError::NotFound("board".to_string()))?;
        let columns = state
            .columns
            .iter()
            .map(|column| ColumnWithTasks {
                column: column.clone(),
                tasks: state.column_tasks(&column.id).into_iter().cloned().collect(),
            })
            .collect();
        Ok(BoardDetails { board, columns })
    }

    fn record(&self, call: ApiCall) -> BoardResult<()> {
        tracing::trace!(?call, "in-memory api call");
        self.calls.borrow_mut().push(call);
        match self.failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn allocate_id(&self, prefix: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        format!("{}-{}", prefix, id)
    }

    fn column(&self, column_id: &str) -> BoardResult<Column> {
        self.state
            .borrow()
            .column(column_id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(format!("column {}", column_id)))
    }

    fn task(&self, task_id: &str) -> BoardResult<Task> {
        self.state
            .borrow()
            .task(task_id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(format!("task {}", task_id)))
    }
}

#[async_trait(?Send)]
impl BoardApi for InMemoryBoardApi {
    async fn get_board_details(&self, board_id: &str) -> BoardResult<BoardDetails> {
        self.record(ApiCall::GetBoardDetails(board_id.to_string()))?;
        let details = self.details()?;
        if details.board.id != board_id {
            return Err(BoardError::NotFound(format!("board {}", board_id)));
        }
        Ok(details)
    }

    async fn create_column(&self, column: NewColumn) -> BoardResult<Column> {
        self.record(ApiCall::CreateColumn(column.clone()))?;
        if column.title.trim().is_empty() {
            return Err(BoardError::InvalidInput("column title is required".to_string()));
        }
        let id = self.allocate_id("col");
        {
            let mut state = self.state.borrow_mut();
            let position = column.position.unwrap_or_else(|| state.next_column_position());
            let mut created = Column::new(id.clone(), column.board_id, column.title, position);
            created.color = column.color;
            state.insert_column(created);
        }
        self.column(&id)
    }

    async fn update_column(&self, column_id: &str, patch: ColumnPatch) -> BoardResult<Column> {
        self.record(ApiCall::UpdateColumn(column_id.to_string(), patch.clone()))?;
        if !self.state.borrow_mut().patch_column(column_id, &patch) {
            return Err(BoardError::NotFound(format!("column {}", column_id)));
        }
        self.column(column_id)
    }

    async fn delete_column(&self, column_id: &str) -> BoardResult<()> {
        self.record(ApiCall::DeleteColumn(column_id.to_string()))?;
        self.state
            .borrow_mut()
            .remove_column(column_id)
            .map(|_| ())
            .ok_or_else(|| BoardError::NotFound(format!("column {}", column_id)))
    }

    async fn create_task(&self, task: NewTask) -> BoardResult<Task> {
        self.record(ApiCall::CreateTask(task.clone()))?;
        self.column(&task.column_id)?;
        let id = self.allocate_id("task");
        {
            let mut state = self.state.borrow_mut();
            let position = task.position.unwrap_or_else(|| state.next_task_position(&task.column_id));
            let mut created = Task::new(id.clone(), task.column_id, task.title, position);
            created.description = task.description;
            created.priority = task.priority;
            created.due_date = task.due_date;
            created.labels = task.labels;
            created.attachments = task.attachments;
            created.completed = task.completed;
            state.insert_task(created);
        }
        self.task(&id)
    }

    async fn update_task(&self, task_id: &str, patch: TaskPatch) -> BoardResult<Task> {
        self.record(ApiCall::UpdateTask(task_id.to_string(), patch.clone()))?;
        if let Some(column_id) = &patch.column_id {
            self.column(column_id)?;
        }
        if !self.state.borrow_mut().patch_task(task_id, &patch) {
            return Err(BoardError::NotFound(format!("task {}", task_id)));
        }
        self.task(task_id)
    }

    async fn move_task(&self, task_id: &str, destination: TaskDestination) -> BoardResult<Task> {
        self.record(ApiCall::MoveTask(task_id.to_string(), destination.clone()))?;
        if destination.position < 0 {
            return Err(BoardError::InvalidInput(format!("negative position {}", destination.position)));
        }
        self.task(task_id)?;
        self.column(&destination.column_id)?;
        self.state.borrow_mut().move_task(task_id, &destination);
        self.task(task_id)
    }

    async fn delete_task(&self, task_id: &str) -> BoardResult<()> {
        self.record(ApiCall::DeleteTask(task_id.to_string()))?;
        self.state
            .borrow_mut()
            .remove_task(task_id)
            .map(|_| ())
            .ok_or_else(|| BoardError::NotFound(format!("task {}", task_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{COLUMN_POSITION_BASE, TASK_POSITION_BASE};
    use crate::position::is_contiguous;

    fn make_api() -> InMemoryBoardApi {
        InMemoryBoardApi::seeded("b1")
    }

    #[tokio::test]
    async fn test_seeded_board_is_contiguous() {
        let api = make_api();
        let details = api.get_board_details("b1").await.unwrap();
        let (_, columns, _) = details.clone().into_parts();
        assert!(is_contiguous(&columns, COLUMN_POSITION_BASE));
        for column in &details.columns {
            assert!(is_contiguous(&column.tasks, TASK_POSITION_BASE));
        }
    }

    #[tokio::test]
    async fn test_unknown_board_is_not_found() {
        let api = make_api();
        let err = api.get_board_details("other").await.unwrap_err();
        assert!(err.is_missing_board());
    }

    #[tokio::test]
    async fn test_move_column_up_shifts_the_skipped_columns() {
        let api = make_api();
        let details = api.details().unwrap();
        let last = details.columns[2].column.id.clone();

        api.update_column(&last, ColumnPatch::position(1)).await.unwrap();

        let (_, columns, _) = api.details().unwrap().into_parts();
        assert_eq!(columns[0].id, last);
        assert!(is_contiguous(&columns, COLUMN_POSITION_BASE));
    }

    #[tokio::test]
    async fn test_move_task_cascades_both_columns() {
        let api = make_api();
        let details = api.details().unwrap();
        let todo = &details.columns[0];
        let doing = &details.columns[1];
        let moved = todo.tasks[0].id.clone();

        let task = api
            .move_task(&moved, TaskDestination::new(doing.column.id.clone(), 0))
            .await
            .unwrap();
        assert_eq!(task.position, 0);

        let after = api.details().unwrap();
        assert_eq!(after.columns[0].tasks.len(), 1);
        assert_eq!(after.columns[1].tasks.len(), 2);
        for column in &after.columns {
            assert!(is_contiguous(&column.tasks, TASK_POSITION_BASE));
        }
    }

    #[tokio::test]
    async fn test_create_task_defaults_to_end_of_column() {
        let api = make_api();
        let column_id = api.details().unwrap().columns[0].column.id.clone();
        let task = api.create_task(NewTask::new(column_id, "")).await.unwrap();
        assert_eq!(task.position, 2);
        assert_eq!(task.title, NewTask::DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_fail_next_fails_once_and_keeps_state() {
        let api = make_api();
        let before = api.details().unwrap();
        api.fail_next(BoardError::Network("offline".to_string()));

        let column_id = before.columns[0].column.id.clone();
        let err = api.delete_column(&column_id).await.unwrap_err();
        assert_eq!(err, BoardError::Network("offline".to_string()));
        assert_eq!(api.details().unwrap(), before);

        api.delete_column(&column_id).await.unwrap();
        assert_eq!(api.mutation_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_targets_are_rejected() {
        let api = make_api();
        assert!(matches!(api.delete_task("nope").await, Err(BoardError::NotFound(_))));
        assert!(matches!(
            api.move_task("nope", TaskDestination::new("col-1", 0)).await,
            Err(BoardError::NotFound(_))
        ));
        let blank = NewColumn {
            title: " ".to_string(),
            board_id: "b1".to_string(),
            position: None,
            color: None,
        };
        assert!(matches!(api.create_column(blank).await, Err(BoardError::InvalidInput(_))));
    }
}
