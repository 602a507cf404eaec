//! Drag Overlay Component
//!
//! Floating copy of the dragged item that follows the pointer.

use leptos::prelude::*;
use taskwave_board::ItemKind;

use crate::context::use_app_context;
use crate::store::{store_column, store_task, use_app_store};

#[component]
pub fn DragOverlay() -> impl IntoView {
    let dnd = use_app_context().dnd;
    let store = use_app_store();

    let ghost = move || {
        let item = dnd.active_read.get()?;
        let pending = dnd.pending_read.get()?;
        let (dx, dy) = dnd.offset_read.get();
        let rect = pending.origin.translated(dx, dy);

        let (class, label) = match item.kind {
            ItemKind::Task => ("drag-overlay task-card", store_task(&store, &item.id)?.title),
            ItemKind::Column => ("drag-overlay kanban-column-header", store_column(&store, &item.id)?.column.title),
        };
        let style = format!(
            "position: fixed; left: {}px; top: {}px; width: {}px; pointer-events: none;",
            rect.left, rect.top, rect.width
        );
        Some(view! { <div class=class style=style>{label}</div> })
    };

    view! { <div class="drag-overlay-layer">{ghost}</div> }
}
