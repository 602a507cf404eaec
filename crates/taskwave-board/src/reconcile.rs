//! Optimistic Reconciliation
//!
//! Every mutating operation follows the same protocol:
//!
//! 1. Apply the change to the local [`BoardStore`] right away
//! 2. Send the matching request to the [`BoardApi`]
//! 3. Notify success or failure
//! 4. Refetch the full board, exactly once, whatever the outcome
//!
//! The refetch is the only reconciliation point. Local optimistic state is
//! never trusted as final and never merged; the server snapshot replaces it.
//! Concurrent gestures are not serialized, so the last refetch to resolve wins.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::api::BoardApi;
use crate::error::{BoardError, BoardResult};
use crate::models::{BoardId, Column, ColumnPatch, NewColumn, NewTask, Task, TaskDestination, TaskPatch};
use crate::position::{has_moved, move_to_position, neighbor_swap, single_column_update, sorted_ids, Direction};
use crate::session::DragIntent;
use crate::store::BoardStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// User-visible, transient notifications (toasts in the browser)
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// How a mutation ended
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Nothing to do: unknown target, or already in place
    Skipped,
    /// Same action already in flight
    Duplicate,
    /// Server accepted; state refetched
    Committed,
    /// Server rejected; optimistic change discarded by the refetch
    RolledBack(BoardError),
}

impl ReconcileOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ReconcileOutcome::Committed)
    }
}

/// Clears its in-flight key when the action settles
struct InFlight {
    keys: Rc<RefCell<HashSet<String>>>,
    key: String,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.keys.borrow_mut().remove(&self.key);
    }
}

/// Applies board mutations optimistically and reconciles them by refetch.
/// Cloning yields another handle sharing the same store and in-flight set.
#[derive(Clone)]
pub struct BoardReconciler {
    board_id: BoardId,
    api: Rc<dyn BoardApi>,
    store: BoardStore,
    notifier: Rc<dyn Notifier>,
    in_flight: Rc<RefCell<HashSet<String>>>,
    provisional: Rc<Cell<u64>>,
}

impl BoardReconciler {
    pub fn new(board_id: impl Into<BoardId>, api: Rc<dyn BoardApi>, store: BoardStore, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            board_id: board_id.into(),
            api,
            store,
            notifier,
            in_flight: Rc::new(RefCell::new(HashSet::new())),
            provisional: Rc::new(Cell::new(0)),
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Whether an action with this key is still outstanding
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.borrow().contains(key)
    }

    // ========================
    // Loading
    // ========================

    /// Initial load, with the loading flag raised while it runs
    pub async fn load(&self) -> BoardResult<()> {
        self.store.set_loading(true);
        self.refresh().await
    }

    /// Replace local state with the server snapshot
    pub async fn refresh(&self) -> BoardResult<()> {
        match self.api.get_board_details(&self.board_id).await {
            Ok(details) => {
                tracing::debug!(board = %self.board_id, columns = details.columns.len(), "board refreshed");
                self.store.update(|state| state.apply_details(details));
                Ok(())
            }
            Err(err) => {
                tracing::error!(board = %self.board_id, error = %err, "board refresh failed");
                let message = if err.is_missing_board() {
                    "Board not found or access denied".to_string()
                } else {
                    err.to_string()
                };
                self.store.update(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Route a drag intent to its mutation
    pub async fn apply_intent(&self, intent: DragIntent) -> ReconcileOutcome {
        match intent {
            DragIntent::MoveTask { task_id, to, .. } => self.move_task(&task_id, to).await,
            DragIntent::ReorderColumns { column_ids } => self.reorder_columns(column_ids).await,
        }
    }

    // ========================
    // Tasks
    // ========================

    /// Move a task; a move onto its current location is skipped
    pub async fn move_task(&self, task_id: &str, destination: TaskDestination) -> ReconcileOutcome {
        let Some(task) = self.store.read(|state| state.task(task_id).cloned()) else {
            tracing::debug!(task = %task_id, "move of unknown task ignored");
            return ReconcileOutcome::Skipped;
        };
        if !has_moved(&task, &destination) {
            return ReconcileOutcome::Skipped;
        }
        let changes_column = task.column_id != destination.column_id;

        self.store.update(|state| state.move_task(task_id, &destination));
        let result = self.api.move_task(task_id, destination).await;

        let success = if changes_column { "Task moved to another column" } else { "Task reordered" };
        self.settle(result, Some(success), "Could not move the task").await
    }

    pub async fn create_task(&self, task: NewTask) -> ReconcileOutcome {
        let Some(_guard) = self.begin(format!("create-task:{}", task.column_id)) else {
            return ReconcileOutcome::Duplicate;
        };
        let Some(position) = self.store.read(|state| {
            state
                .column(&task.column_id)
                .map(|_| task.position.unwrap_or_else(|| state.next_task_position(&task.column_id)))
        }) else {
            return ReconcileOutcome::Skipped;
        };
        let task = NewTask {
            position: Some(position),
            ..task
        };

        let mut placeholder = Task::new(self.provisional_id("task"), task.column_id.clone(), task.title.clone(), position);
        placeholder.priority = task.priority;
        placeholder.description = task.description.clone();
        self.store.update(|state| state.insert_task(placeholder));

        let result = self.api.create_task(task).await;
        self.settle(result, Some("Task created"), "Could not create the task").await
    }

    pub async fn edit_task(&self, task_id: &str, patch: TaskPatch) -> ReconcileOutcome {
        let Some(_guard) = self.begin(format!("edit-task:{}", task_id)) else {
            return ReconcileOutcome::Duplicate;
        };
        if !self.store.update(|state| state.patch_task(task_id, &patch)) {
            return ReconcileOutcome::Skipped;
        }
        let result = self.api.update_task(task_id, patch).await;
        self.settle(result, Some("Task updated"), "Could not update the task").await
    }

    pub async fn toggle_task_completion(&self, task_id: &str) -> ReconcileOutcome {
        let Some(_guard) = self.begin(format!("toggle-task:{}", task_id)) else {
            return ReconcileOutcome::Duplicate;
        };
        let Some(completed) = self.store.read(|state| state.task(task_id).map(|task| !task.completed)) else {
            return ReconcileOutcome::Skipped;
        };
        let patch = TaskPatch::completed(completed);
        self.store.update(|state| state.patch_task(task_id, &patch));

        let result = self.api.update_task(task_id, patch).await;
        let success = if completed { "Task completed" } else { "Task reopened" };
        self.settle(result, Some(success), "Could not update the task").await
    }

    pub async fn delete_task(&self, task_id: &str) -> ReconcileOutcome {
        let Some(_guard) = self.begin(format!("delete-task:{}", task_id)) else {
            return ReconcileOutcome::Duplicate;
        };
        if self.store.update(|state| state.remove_task(task_id)).is_none() {
            return ReconcileOutcome::Skipped;
        }
        let result = self.api.delete_task(task_id).await;
        self.settle(result, Some("Task deleted"), "Could not delete the task").await
    }

    // ========================
    // Columns
    // ========================

    /// Apply a new column order with a single position update. The server
    /// shifts every other column.
    pub async fn reorder_columns(&self, column_ids: Vec<String>) -> ReconcileOutcome {
        let current = self.store.read(|state| sorted_ids(&state.columns));
        let Some((column_id, position)) = single_column_update(&current, &column_ids) else {
            return ReconcileOutcome::Skipped;
        };
        tracing::debug!(column = %column_id, position, "reordering columns");

        self.store.update(|state| state.reorder_columns(&column_ids));
        let result = self.api.update_column(&column_id, ColumnPatch::position(position)).await;
        self.settle(result, Some("Column order updated"), "Could not reorder the columns").await
    }

    /// Move a column to a 1-indexed position; out of range is skipped
    pub async fn move_column_to(&self, column_id: &str, position: i32) -> ReconcileOutcome {
        let order = self.store.read(|state| move_to_position(&state.columns, column_id, position));
        match order {
            Some(order) => self.reorder_columns(order).await,
            None => ReconcileOutcome::Skipped,
        }
    }

    /// Swap a column with its neighbour; a no-op at either edge
    pub async fn move_column_by(&self, column_id: &str, direction: Direction) -> ReconcileOutcome {
        let order = self.store.read(|state| neighbor_swap(&state.columns, column_id, direction));
        match order {
            Some(order) => self.reorder_columns(order).await,
            None => ReconcileOutcome::Skipped,
        }
    }

    /// Append a column after the last one
    pub async fn create_column(&self, title: &str) -> ReconcileOutcome {
        let title = title.trim();
        if title.is_empty() {
            self.notifier.notify(NoticeLevel::Info, "Column title is required");
            return ReconcileOutcome::Skipped;
        }
        let Some(_guard) = self.begin("create-column".to_string()) else {
            return ReconcileOutcome::Duplicate;
        };
        let position = self.store.read(|state| state.next_column_position());
        let placeholder = Column::new(self.provisional_id("column"), self.board_id.clone(), title, position);
        self.store.update(|state| state.insert_column(placeholder));

        let column = NewColumn {
            title: title.to_string(),
            board_id: self.board_id.clone(),
            position: Some(position),
            color: None,
        };
        let result = self.api.create_column(column).await;
        self.settle(result, Some("Column created"), "Could not create the column").await
    }

    pub async fn edit_column(&self, column_id: &str, patch: ColumnPatch) -> ReconcileOutcome {
        let Some(_guard) = self.begin(format!("edit-column:{}", column_id)) else {
            return ReconcileOutcome::Duplicate;
        };
        if !self.store.update(|state| state.patch_column(column_id, &patch)) {
            return ReconcileOutcome::Skipped;
        }
        let result = self.api.update_column(column_id, patch).await;
        self.settle(result, Some("Column updated"), "Could not update the column").await
    }

    /// Delete a column and the tasks inside it
    pub async fn delete_column(&self, column_id: &str) -> ReconcileOutcome {
        let Some(_guard) = self.begin(format!("delete-column:{}", column_id)) else {
            return ReconcileOutcome::Duplicate;
        };
        if self.store.update(|state| state.remove_column(column_id)).is_none() {
            return ReconcileOutcome::Skipped;
        }
        let result = self.api.delete_column(column_id).await;
        self.settle(result, Some("Column deleted"), "Could not delete the column").await
    }

    // ========================
    // Protocol
    // ========================

    fn begin(&self, key: String) -> Option<InFlight> {
        if !self.in_flight.borrow_mut().insert(key.clone()) {
            tracing::debug!(%key, "duplicate submission ignored");
            return None;
        }
        Some(InFlight {
            keys: Rc::clone(&self.in_flight),
            key,
        })
    }

    fn provisional_id(&self, kind: &str) -> String {
        let next = self.provisional.get() + 1;
        self.provisional.set(next);
        format!("pending-{}-{}", kind, next)
    }

    async fn settle<T>(&self, result: BoardResult<T>, success: Option<&str>, failure: &str) -> ReconcileOutcome {
        let outcome = match result {
            Ok(_) => {
                if let Some(message) = success {
                    self.notifier.notify(NoticeLevel::Success, message);
                }
                ReconcileOutcome::Committed
            }
            Err(err) => {
                tracing::warn!(error = %err, "{}", failure);
                self.notifier.notify(NoticeLevel::Error, failure);
                ReconcileOutcome::RolledBack(err)
            }
        };
        // Refresh failures are recorded on the store and logged
        let _ = self.refresh().await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::collision::Rect;
    use crate::memory::{ApiCall, InMemoryBoardApi};
    use crate::models::{Board, BoardDetails, ColumnWithTasks, ItemKind, COLUMN_POSITION_BASE, TASK_POSITION_BASE};
    use crate::position::is_contiguous;
    use crate::session::{DragEndEvent, DragItem, DragSession, OverTarget};

    #[derive(Default)]
    struct RecordingNotifier {
        notices: RefCell<Vec<(NoticeLevel, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices.borrow_mut().push((level, message.to_string()));
        }
    }

    impl RecordingNotifier {
        fn levels(&self) -> Vec<NoticeLevel> {
            self.notices.borrow().iter().map(|(level, _)| *level).collect()
        }
    }

    /// Yields once before each reply so concurrent calls interleave
    struct YieldingApi(Rc<InMemoryBoardApi>);

    #[async_trait(?Send)]
    impl BoardApi for YieldingApi {
        async fn get_board_details(&self, board_id: &str) -> BoardResult<BoardDetails> {
            tokio::task::yield_now().await;
            self.0.get_board_details(board_id).await
        }
        async fn create_column(&self, column: NewColumn) -> BoardResult<Column> {
            tokio::task::yield_now().await;
            self.0.create_column(column).await
        }
        async fn update_column(&self, column_id: &str, patch: ColumnPatch) -> BoardResult<Column> {
            tokio::task::yield_now().await;
            self.0.update_column(column_id, patch).await
        }
        async fn delete_column(&self, column_id: &str) -> BoardResult<()> {
            tokio::task::yield_now().await;
            self.0.delete_column(column_id).await
        }
        async fn create_task(&self, task: NewTask) -> BoardResult<Task> {
            tokio::task::yield_now().await;
            self.0.create_task(task).await
        }
        async fn update_task(&self, task_id: &str, patch: TaskPatch) -> BoardResult<Task> {
            tokio::task::yield_now().await;
            self.0.update_task(task_id, patch).await
        }
        async fn move_task(&self, task_id: &str, destination: TaskDestination) -> BoardResult<Task> {
            tokio::task::yield_now().await;
            self.0.move_task(task_id, destination).await
        }
        async fn delete_task(&self, task_id: &str) -> BoardResult<()> {
            tokio::task::yield_now().await;
            self.0.delete_task(task_id).await
        }
    }

    /// c1: t1, t2; c2: t3, t4; c3: empty
    fn make_details() -> BoardDetails {
        let column = |id: &str, position: i32, tasks: Vec<Task>| ColumnWithTasks {
            column: Column::new(id, "b1", id.to_uppercase(), position),
            tasks,
        };
        BoardDetails {
            board: Board {
                id: "b1".to_string(),
                title: "Board".to_string(),
                description: None,
                background_color: None,
                created_at: chrono::Utc::now(),
                updated_at: None,
            },
            columns: vec![
                column("c1", 1, vec![Task::new("t1", "c1", "one", 0), Task::new("t2", "c1", "two", 1)]),
                column("c2", 2, vec![Task::new("t3", "c2", "three", 0), Task::new("t4", "c2", "four", 1)]),
                column("c3", 3, vec![]),
            ],
        }
    }

    async fn make_reconciler() -> (BoardReconciler, Rc<InMemoryBoardApi>, Rc<RecordingNotifier>) {
        let api = Rc::new(InMemoryBoardApi::from_details(make_details()));
        let notifier = Rc::new(RecordingNotifier::default());
        let reconciler = BoardReconciler::new("b1", api.clone(), BoardStore::new(), notifier.clone());
        reconciler.load().await.unwrap();
        api.clear_calls();
        (reconciler, api, notifier)
    }

    fn refetch_count(calls: &[ApiCall]) -> usize {
        calls.iter().filter(|call| matches!(call, ApiCall::GetBoardDetails(_))).count()
    }

    #[tokio::test]
    async fn test_drop_on_column_appends_and_refetches() {
        let (reconciler, api, notifier) = make_reconciler().await;
        let columns = reconciler.store().enriched_columns();

        let mut session = DragSession::new();
        session.start(DragItem::task("t1"));
        let intent = session
            .end(
                &columns,
                &DragEndEvent {
                    over: Some(OverTarget {
                        id: "c2".to_string(),
                        kind: ItemKind::Column,
                        rect: Rect::default(),
                    }),
                    active_translated_top: None,
                },
            )
            .unwrap();

        let outcome = reconciler.apply_intent(intent).await;
        assert_eq!(outcome, ReconcileOutcome::Committed);

        let calls = api.calls();
        assert_eq!(calls[0], ApiCall::MoveTask("t1".to_string(), TaskDestination::new("c2", 2)));
        assert_eq!(refetch_count(&calls), 1);

        let state = reconciler.store().snapshot();
        let moved = state.task("t1").unwrap();
        assert_eq!((moved.column_id.as_str(), moved.position), ("c2", 2));
        assert_eq!(notifier.levels(), vec![NoticeLevel::Success]);
    }

    #[tokio::test]
    async fn test_column_reorder_sends_one_update() {
        let (reconciler, api, _) = make_reconciler().await;
        let order = vec!["c3".to_string(), "c1".to_string(), "c2".to_string()];

        let outcome = reconciler.reorder_columns(order.clone()).await;
        assert!(outcome.is_committed());

        assert_eq!(
            api.mutation_calls(),
            vec![ApiCall::UpdateColumn("c3".to_string(), ColumnPatch::position(1))]
        );
        let state = reconciler.store().snapshot();
        assert_eq!(sorted_ids(&state.columns), order);
    }

    #[tokio::test]
    async fn test_rightward_column_move_sends_arriving_column() {
        let (reconciler, api, _) = make_reconciler().await;

        reconciler
            .reorder_columns(vec!["c2".to_string(), "c3".to_string(), "c1".to_string()])
            .await;

        assert_eq!(
            api.mutation_calls(),
            vec![ApiCall::UpdateColumn("c2".to_string(), ColumnPatch::position(1))]
        );
        // The refetch shows where the server actually put it
        assert_eq!(
            sorted_ids(&reconciler.store().snapshot().columns),
            vec!["c2".to_string(), "c1".to_string(), "c3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_reorder_rolls_back_with_one_refetch() {
        let (reconciler, api, notifier) = make_reconciler().await;
        let before = reconciler.store().snapshot();
        api.fail_next(BoardError::Network("connection reset".to_string()));

        let outcome = reconciler
            .reorder_columns(vec!["c3".to_string(), "c1".to_string(), "c2".to_string()])
            .await;

        assert_eq!(outcome, ReconcileOutcome::RolledBack(BoardError::Network("connection reset".to_string())));
        assert_eq!(refetch_count(&api.calls()), 1);
        let after = reconciler.store().snapshot();
        assert_eq!(after.columns, before.columns);
        assert_eq!(after.tasks, before.tasks);
        assert_eq!(notifier.levels(), vec![NoticeLevel::Error]);
    }

    #[tokio::test]
    async fn test_repeated_move_is_skipped() {
        let (reconciler, api, _) = make_reconciler().await;
        let destination = TaskDestination::new("c3", 0);

        assert!(reconciler.move_task("t2", destination.clone()).await.is_committed());
        api.clear_calls();

        assert_eq!(reconciler.move_task("t2", destination).await, ReconcileOutcome::Skipped);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stale_targets_are_skipped() {
        let (reconciler, api, _) = make_reconciler().await;
        assert_eq!(
            reconciler.move_task("gone", TaskDestination::new("c1", 0)).await,
            ReconcileOutcome::Skipped
        );
        assert_eq!(reconciler.delete_column("gone").await, ReconcileOutcome::Skipped);
        assert_eq!(reconciler.move_column_to("c1", 7).await, ReconcileOutcome::Skipped);
        assert_eq!(reconciler.move_column_by("c1", Direction::Left).await, ReconcileOutcome::Skipped);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_delete_is_ignored_while_in_flight() {
        let inner = Rc::new(InMemoryBoardApi::from_details(make_details()));
        let api = Rc::new(YieldingApi(inner.clone()));
        let reconciler = BoardReconciler::new("b1", api, BoardStore::new(), Rc::new(RecordingNotifier::default()));
        reconciler.load().await.unwrap();

        let (first, second) = tokio::join!(reconciler.delete_task("t1"), reconciler.delete_task("t1"));

        assert_eq!(first, ReconcileOutcome::Committed);
        assert_eq!(second, ReconcileOutcome::Duplicate);
        assert_eq!(inner.mutation_calls(), vec![ApiCall::DeleteTask("t1".to_string())]);
        assert!(!reconciler.is_in_flight("delete-task:t1"));
    }

    #[tokio::test]
    async fn test_toggle_completion_round_trips() {
        let (reconciler, api, notifier) = make_reconciler().await;

        reconciler.toggle_task_completion("t3").await;
        assert!(reconciler.store().snapshot().task("t3").unwrap().completed);
        assert_eq!(
            api.mutation_calls(),
            vec![ApiCall::UpdateTask("t3".to_string(), TaskPatch::completed(true))]
        );

        reconciler.toggle_task_completion("t3").await;
        assert!(!reconciler.store().snapshot().task("t3").unwrap().completed);
        let messages: Vec<String> = notifier.notices.borrow().iter().map(|(_, m)| m.clone()).collect();
        assert_eq!(messages, vec!["Task completed", "Task reopened"]);
    }

    #[tokio::test]
    async fn test_create_task_appends_and_replaces_placeholder() {
        let (reconciler, _, _) = make_reconciler().await;

        let outcome = reconciler.create_task(NewTask::new("c1", "Write docs")).await;
        assert!(outcome.is_committed());

        let state = reconciler.store().snapshot();
        let tasks = state.column_tasks("c1");
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].title, "Write docs");
        assert!(!tasks[2].id.starts_with("pending-"));

        assert_eq!(reconciler.create_task(NewTask::new("gone", "x")).await, ReconcileOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_blank_column_title_is_rejected_locally() {
        let (reconciler, api, notifier) = make_reconciler().await;
        assert_eq!(reconciler.create_column("  ").await, ReconcileOutcome::Skipped);
        assert!(api.calls().is_empty());
        assert_eq!(notifier.levels(), vec![NoticeLevel::Info]);
    }

    #[tokio::test]
    async fn test_positions_stay_contiguous_across_operations() {
        let (reconciler, _, _) = make_reconciler().await;

        let check = |reconciler: &BoardReconciler| {
            let state = reconciler.store().snapshot();
            assert!(is_contiguous(&state.columns, COLUMN_POSITION_BASE));
            for column in &state.columns {
                let tasks: Vec<Task> = state.column_tasks(&column.id).into_iter().cloned().collect();
                assert!(is_contiguous(&tasks, TASK_POSITION_BASE));
            }
        };

        reconciler.create_column("Review").await;
        check(&reconciler);
        reconciler.move_column_to("c1", 4).await;
        check(&reconciler);
        reconciler.delete_column("c2").await;
        check(&reconciler);
        reconciler.move_column_by("c3", Direction::Left).await;
        check(&reconciler);
        reconciler.move_task("t1", TaskDestination::new("c3", 0)).await;
        check(&reconciler);
        reconciler.delete_task("t2").await;
        check(&reconciler);

        assert_eq!(reconciler.store().snapshot().columns.len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_store_error() {
        let (reconciler, api, _) = make_reconciler().await;
        api.fail_next(BoardError::Http {
            status: 404,
            message: "missing".to_string(),
        });

        assert!(reconciler.refresh().await.is_err());
        let state = reconciler.store().snapshot();
        assert_eq!(state.error.as_deref(), Some("Board not found or access denied"));
        assert!(!state.loading);
    }
}
