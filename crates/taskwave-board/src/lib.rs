//! Taskwave Board Core
//!
//! Target-independent kanban logic:
//! - models: board, column and task entities plus derived views
//! - position: ordering rules and reordering
//! - collision: drop target resolution during a drag
//! - session: drag gesture state machine
//! - schedule: frame-coalesced dispatch of drag-over intents
//! - enrich: columns populated with their sorted tasks
//! - store: shared board state with subscriber notification
//! - reconcile: optimistic mutations reconciled by full refetch
//! - api / memory: collaborator contract and in-memory implementation

mod error;
mod models;

pub mod api;
pub mod collision;
pub mod controller;
pub mod enrich;
pub mod memory;
pub mod position;
pub mod reconcile;
pub mod schedule;
pub mod session;
pub mod store;

pub use api::BoardApi;
pub use collision::{Collision, Droppable, Rect};
pub use controller::DragController;
pub use enrich::derive_enriched_columns;
pub use error::{BoardError, BoardResult};
pub use memory::{ApiCall, InMemoryBoardApi};
pub use models::*;
pub use position::{has_moved, reorder, Direction};
pub use reconcile::{BoardReconciler, NoticeLevel, Notifier, ReconcileOutcome};
pub use schedule::{FrameCoalescer, FrameScheduler, ImmediateScheduler, ManualScheduler};
pub use session::{DragEndEvent, DragIntent, DragItem, DragOverEvent, DragSession, DragState, OverTarget};
pub use store::{BoardState, BoardStore, SubscriptionId};
