//! UI Components
//!
//! Leptos components for the board.

mod delete_confirm_button;
mod drag_overlay;
mod inline_add_form;
mod kanban_board;
mod kanban_column;
mod kanban_task;
mod log_panel;
mod toast_list;

pub use delete_confirm_button::DeleteConfirmButton;
pub use drag_overlay::DragOverlay;
pub use inline_add_form::InlineAddForm;
pub use kanban_board::KanbanBoard;
pub use kanban_column::KanbanColumn;
pub use kanban_task::KanbanTask;
pub use log_panel::LogPanel;
pub use toast_list::ToastList;
