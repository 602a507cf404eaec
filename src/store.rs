//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The board
//! core owns the canonical [`BoardStore`]; this view store mirrors it
//! through a subscription so components re-render per field.

use leptos::prelude::*;
use reactive_stores::Store;
use taskwave_board::position::{column_nav, columns_key, ColumnNav};
use taskwave_board::{BoardState, BoardStore, EnrichedColumn, Task};

/// Render-ready board state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    pub board_title: String,
    pub board_color: Option<String>,
    /// Columns with their sorted tasks, in position order
    pub columns: Vec<EnrichedColumn>,
    /// Changes whenever column order changes
    pub columns_key: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Copy a core snapshot into the view store
pub fn store_sync_board(store: &AppStore, state: &BoardState) {
    let columns = state.enriched_columns();
    store.columns_key().set(columns_key(&columns));
    store.columns().set(columns);
    store.loading().set(state.loading);
    store.error().set(state.error.clone());
    if let Some(board) = &state.board {
        store.board_title().set(board.title.clone());
        store.board_color().set(board.background_color.clone());
    }
}

/// Keep the view store in step with the core store
pub fn bind_board_store(board: &BoardStore, store: AppStore) {
    board.read(|state| store_sync_board(&store, state));
    board.subscribe(move |state| store_sync_board(&store, state));
}

/// A column by id, tracked
pub fn store_column(store: &AppStore, column_id: &str) -> Option<EnrichedColumn> {
    store.columns().with(|columns| columns.iter().find(|column| column.id() == column_id).cloned())
}

/// A task by id, tracked
pub fn store_task(store: &AppStore, task_id: &str) -> Option<Task> {
    store.columns().with(|columns| {
        columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .find(|task| task.id == task_id)
            .cloned()
    })
}

/// Whether a column can shift left or right, tracked
pub fn store_column_nav(store: &AppStore, column_id: &str) -> ColumnNav {
    store.columns().with(|columns| column_nav(columns, column_id)).unwrap_or(ColumnNav {
        can_move_left: false,
        can_move_right: false,
    })
}
