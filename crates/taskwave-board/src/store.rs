//! Board Store
//!
//! Holds the raw board collections (board, columns, tasks) shared between
//! the drag subsystem and the reconciler. Local mutations here are the
//! optimistic half of every change; the server snapshot always replaces
//! them on the next refetch.

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use crate::enrich::derive_enriched_columns;
use crate::models::{
    Board, BoardDetails, Column, ColumnPatch, EnrichedColumn, Task, TaskDestination, TaskPatch, COLUMN_POSITION_BASE,
    TASK_POSITION_BASE,
};
use crate::position::{cascade_column_move, renumber, sorted_ids};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub board: Option<Board>,
    /// Sorted by position
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped on every store update
    pub revision: u64,
}

impl BoardState {
    /// Replace everything with a server snapshot
    pub fn apply_details(&mut self, details: BoardDetails) {
        let (board, mut columns, tasks) = details.into_parts();
        columns.sort_by_key(|column| column.position);
        self.board = Some(board);
        self.columns = columns;
        self.tasks = tasks;
        self.loading = false;
        self.error = None;
    }

    pub fn enriched_columns(&self) -> Vec<EnrichedColumn> {
        derive_enriched_columns(&self.columns, &self.tasks)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Tasks of one column in position order
    pub fn column_tasks(&self, column_id: &str) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|task| task.column_id == column_id).collect();
        tasks.sort_by_key(|task| task.position);
        tasks
    }

    pub fn next_column_position(&self) -> i32 {
        self.columns
            .iter()
            .map(|column| column.position + 1)
            .max()
            .unwrap_or(COLUMN_POSITION_BASE)
    }

    pub fn next_task_position(&self, column_id: &str) -> i32 {
        self.tasks
            .iter()
            .filter(|task| task.column_id == column_id)
            .map(|task| task.position + 1)
            .max()
            .unwrap_or(TASK_POSITION_BASE)
    }

    // ========================
    // Tasks
    // ========================

    /// Relocate a task, closing the gap it leaves and opening one where it lands.
    /// Returns `false` when the task or destination column is unknown.
    pub fn move_task(&mut self, task_id: &str, destination: &TaskDestination) -> bool {
        if self.column(&destination.column_id).is_none() {
            return false;
        }
        let Some(index) = self.tasks.iter().position(|task| task.id == task_id) else {
            return false;
        };
        let mut task = self.tasks.remove(index);
        let source = mem::replace(&mut task.column_id, destination.column_id.clone());

        let mut siblings = self.take_column_tasks(&destination.column_id);
        let at = (destination.position.max(0) as usize).min(siblings.len());
        siblings.insert(at, task);
        renumber(&mut siblings, TASK_POSITION_BASE);
        self.tasks.extend(siblings);

        if source != destination.column_id {
            self.renumber_column_tasks(&source);
        }
        true
    }

    /// Insert a task at its own position, shifting later siblings down
    pub fn insert_task(&mut self, task: Task) {
        let column_id = task.column_id.clone();
        let mut siblings = self.take_column_tasks(&column_id);
        let at = (task.position.max(0) as usize).min(siblings.len());
        siblings.insert(at, task);
        renumber(&mut siblings, TASK_POSITION_BASE);
        self.tasks.extend(siblings);
    }

    pub fn patch_task(&mut self, task_id: &str, patch: &TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return false;
        };
        patch.apply_fields(task);
        if !patch.moves() {
            return true;
        }
        let column_id = patch.column_id.clone().unwrap_or_else(|| task.column_id.clone());
        let position = match patch.position {
            Some(position) => position,
            None if column_id == task.column_id => task.position,
            None => i32::MAX,
        };
        self.move_task(task_id, &TaskDestination::new(column_id, position))
    }

    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == task_id)?;
        let task = self.tasks.remove(index);
        self.renumber_column_tasks(&task.column_id);
        Some(task)
    }

    // ========================
    // Columns
    // ========================

    /// Rearrange columns to follow `column_ids`; unknown ids are ignored and
    /// unlisted columns keep their relative order at the end.
    pub fn reorder_columns(&mut self, column_ids: &[String]) {
        let mut remaining = mem::take(&mut self.columns);
        let mut ordered = Vec::with_capacity(remaining.len());
        for id in column_ids {
            if let Some(index) = remaining.iter().position(|column| &column.id == id) {
                ordered.push(remaining.remove(index));
            }
        }
        ordered.extend(remaining);
        renumber(&mut ordered, COLUMN_POSITION_BASE);
        self.columns = ordered;
    }

    pub fn insert_column(&mut self, column: Column) {
        let at = self
            .columns
            .iter()
            .position(|existing| existing.position > column.position)
            .unwrap_or(self.columns.len());
        self.columns.insert(at, column);
        renumber(&mut self.columns, COLUMN_POSITION_BASE);
    }

    pub fn patch_column(&mut self, column_id: &str, patch: &ColumnPatch) -> bool {
        let Some(column) = self.columns.iter_mut().find(|column| column.id == column_id) else {
            return false;
        };
        patch.apply_fields(column);
        if let Some(position) = patch.position {
            if let Some(order) = cascade_column_move(&sorted_ids(&self.columns), column_id, position) {
                self.reorder_columns(&order);
            }
        }
        true
    }

    /// Remove a column together with its tasks
    pub fn remove_column(&mut self, column_id: &str) -> Option<Column> {
        let index = self.columns.iter().position(|column| column.id == column_id)?;
        let column = self.columns.remove(index);
        self.tasks.retain(|task| task.column_id != column_id);
        renumber(&mut self.columns, COLUMN_POSITION_BASE);
        Some(column)
    }

    fn take_column_tasks(&mut self, column_id: &str) -> Vec<Task> {
        let (mut taken, rest): (Vec<Task>, Vec<Task>) = mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.column_id == column_id);
        self.tasks = rest;
        taken.sort_by_key(|task| task.position);
        taken
    }

    fn renumber_column_tasks(&mut self, column_id: &str) {
        let mut tasks = self.take_column_tasks(column_id);
        renumber(&mut tasks, TASK_POSITION_BASE);
        self.tasks.extend(tasks);
    }
}

/// Handle returned by [`BoardStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&BoardState)>;

/// Shared, observable board state. Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct BoardStore {
    state: Rc<RefCell<BoardState>>,
    subscribers: Rc<RefCell<Vec<(SubscriptionId, Subscriber)>>>,
    next_id: Rc<Cell<u64>>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BoardState {
        self.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn enriched_columns(&self) -> Vec<EnrichedColumn> {
        self.read(BoardState::enriched_columns)
    }

    /// Mutate, bump the revision, then notify subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        let result = {
            let mut state = self.state.borrow_mut();
            let result = f(&mut state);
            state.revision += 1;
            result
        };
        self.notify();
        result
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|state| state.loading = loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.update(|state| state.error = error);
    }

    pub fn subscribe(&self, subscriber: impl Fn(&BoardState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    fn notify(&self) {
        // Subscribers may update the store or (un)subscribe while being notified
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect();
        let snapshot = self.snapshot();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::is_contiguous;

    fn make_state() -> BoardState {
        BoardState {
            columns: vec![
                Column::new("c1", "b1", "Todo", 1),
                Column::new("c2", "b1", "Doing", 2),
                Column::new("c3", "b1", "Done", 3),
            ],
            tasks: vec![
                Task::new("t1", "c1", "a", 0),
                Task::new("t2", "c1", "b", 1),
                Task::new("t3", "c1", "c", 2),
                Task::new("t4", "c2", "d", 0),
            ],
            ..Default::default()
        }
    }

    fn order(state: &BoardState, column_id: &str) -> Vec<String> {
        state.column_tasks(column_id).iter().map(|task| task.id.clone()).collect()
    }

    fn assert_contiguous(state: &BoardState) {
        assert!(is_contiguous(&state.columns, COLUMN_POSITION_BASE));
        for column in &state.columns {
            let tasks: Vec<Task> = state.column_tasks(&column.id).into_iter().cloned().collect();
            assert!(is_contiguous(&tasks, TASK_POSITION_BASE), "column {} not contiguous", column.id);
        }
    }

    #[test]
    fn test_move_task_within_column() {
        let mut state = make_state();
        assert!(state.move_task("t1", &TaskDestination::new("c1", 2)));
        assert_eq!(order(&state, "c1"), vec!["t2", "t3", "t1"]);
        assert_contiguous(&state);
    }

    #[test]
    fn test_move_task_across_columns_closes_gap() {
        let mut state = make_state();
        assert!(state.move_task("t2", &TaskDestination::new("c2", 0)));
        assert_eq!(order(&state, "c1"), vec!["t1", "t3"]);
        assert_eq!(order(&state, "c2"), vec!["t2", "t4"]);
        assert_eq!(state.task("t2").unwrap().column_id, "c2");
        assert_contiguous(&state);

        // Past the end clamps to an append
        assert!(state.move_task("t1", &TaskDestination::new("c3", 9)));
        assert_eq!(state.task("t1").unwrap().position, 0);
        assert_contiguous(&state);
    }

    #[test]
    fn test_move_task_unknown_targets() {
        let mut state = make_state();
        let before = state.clone();
        assert!(!state.move_task("missing", &TaskDestination::new("c1", 0)));
        assert!(!state.move_task("t1", &TaskDestination::new("missing", 0)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_reorder_columns_renumbers_from_one() {
        let mut state = make_state();
        state.reorder_columns(&["c3".to_string(), "c1".to_string(), "c2".to_string()]);
        let positions: Vec<(&str, i32)> = state.columns.iter().map(|c| (c.id.as_str(), c.position)).collect();
        assert_eq!(positions, vec![("c3", 1), ("c1", 2), ("c2", 3)]);
    }

    #[test]
    fn test_remove_column_drops_its_tasks() {
        let mut state = make_state();
        let removed = state.remove_column("c1").unwrap();
        assert_eq!(removed.id, "c1");
        assert!(state.tasks.iter().all(|task| task.column_id != "c1"));
        assert_eq!(state.columns[0].position, 1);
        assert_contiguous(&state);
    }

    #[test]
    fn test_insert_and_remove_task_keep_positions_contiguous() {
        let mut state = make_state();
        state.insert_task(Task::new("t9", "c1", "new", 1));
        assert_eq!(order(&state, "c1"), vec!["t1", "t9", "t2", "t3"]);
        assert_contiguous(&state);

        state.remove_task("t1");
        assert_eq!(state.task("t9").unwrap().position, 0);
        assert_contiguous(&state);
    }

    #[test]
    fn test_patch_column_position_clamps() {
        let mut state = make_state();
        assert!(state.patch_column("c1", &ColumnPatch::position(10)));
        assert_eq!(state.columns.last().unwrap().id, "c1");
        assert_contiguous(&state);
    }

    #[test]
    fn test_next_positions() {
        let state = make_state();
        assert_eq!(state.next_column_position(), 4);
        assert_eq!(state.next_task_position("c1"), 3);
        assert_eq!(state.next_task_position("c3"), 0);
        assert_eq!(BoardState::default().next_column_position(), 1);
    }

    #[test]
    fn test_subscribers_notified_until_unsubscribed() {
        let store = BoardStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |state| sink.borrow_mut().push(state.revision));

        store.set_loading(true);
        store.set_loading(false);
        store.unsubscribe(id);
        store.set_loading(true);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(store.snapshot().revision, 3);
    }
}
