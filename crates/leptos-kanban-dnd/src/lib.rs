//! Leptos Kanban DragDrop
//!
//! Pointer and keyboard sensors for kanban boards in Leptos.
//! A press only becomes a drag after the pointer travels past the
//! activation distance, so clicks stay clicks. Sensors measure the
//! droppables in the DOM and feed the board's [`DragController`].

pub mod dom;
pub mod sensor;

use leptos::prelude::*;
use taskwave_board::{DragController, DragItem, DragOverEvent, Rect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub use dom::{kind_attr, measure_droppables, AnimationFrameScheduler, ID_ATTR, KIND_ATTR};
pub use sensor::{exceeds_activation, key_action, resolve_over, DragConfig, KeyAction};

/// A pressed item that has not moved far enough to drag yet, or the
/// origin of the drag in progress
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDrag {
    pub item: DragItem,
    pub start_x: f64,
    pub start_y: f64,
    /// Client rect of the item when pressed
    pub origin: Rect,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    /// Item being dragged, for styling
    pub active_read: ReadSignal<Option<DragItem>>,
    pub active_write: WriteSignal<Option<DragItem>>,
    /// Id of the current drop target, for highlighting
    pub over_read: ReadSignal<Option<String>>,
    pub over_write: WriteSignal<Option<String>>,
    pub pending_read: ReadSignal<Option<PendingDrag>>,
    pub pending_write: WriteSignal<Option<PendingDrag>>,
    /// Translation of the dragged item from its origin
    pub offset_read: ReadSignal<(f64, f64)>,
    pub offset_write: WriteSignal<(f64, f64)>,
    /// Whether the drag in progress is keyboard driven
    pub keyboard_read: ReadSignal<bool>,
    pub keyboard_write: WriteSignal<bool>,
    /// True briefly after a drop so the trailing click can be ignored
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
}

pub fn create_dnd_signals() -> DndSignals {
    let (active_read, active_write) = signal(None::<DragItem>);
    let (over_read, over_write) = signal(None::<String>);
    let (pending_read, pending_write) = signal(None::<PendingDrag>);
    let (offset_read, offset_write) = signal((0.0f64, 0.0f64));
    let (keyboard_read, keyboard_write) = signal(false);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    DndSignals {
        active_read,
        active_write,
        over_read,
        over_write,
        pending_read,
        pending_write,
        offset_read,
        offset_write,
        keyboard_read,
        keyboard_write,
        drag_just_ended_read,
        drag_just_ended_write,
    }
}

impl DndSignals {
    pub fn is_active(&self, id: &str) -> bool {
        self.active_read.with(|active| active.as_ref().is_some_and(|item| item.id == id))
    }

    pub fn is_over(&self, id: &str) -> bool {
        self.over_read.with(|over| over.as_deref() == Some(id))
    }

    /// CSS transform for the dragged item
    pub fn transform(&self) -> String {
        let (dx, dy) = self.offset_read.get();
        format!("translate({}px, {}px)", dx, dy)
    }

    /// Drag-over event for the active drag at its current offset
    fn current_event(&self, pending: &PendingDrag) -> DragOverEvent {
        let (dx, dy) = self.offset_read.get_untracked();
        let translated = pending.origin.translated(dx, dy);
        let event = resolve_over(&pending.item.id, &translated, &measure_droppables());
        self.over_write.set(event.over.as_ref().map(|over| over.id.clone()));
        event
    }
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.active_write.set(None);
    dnd.over_write.set(None);
    dnd.pending_write.set(None);
    dnd.offset_write.set((0.0, 0.0));
    dnd.keyboard_write.set(false);
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Create mousedown handler for draggable items.
/// Records a pending drag with the press point and the item's rect.
pub fn make_on_mousedown(dnd: DndSignals, item: DragItem) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 || dom::is_form_control(&ev) || dnd.keyboard_read.get_untracked() {
            return;
        }
        // Nested draggables (task inside column): the innermost wins
        ev.stop_propagation();
        let Some(origin) = dom::current_target_rect(&ev) else {
            return;
        };
        dnd.pending_write.set(Some(PendingDrag {
            item: item.clone(),
            start_x: ev.client_x() as f64,
            start_y: ev.client_y() as f64,
            origin,
        }));
    }
}

/// Bind document-level mousemove and mouseup.
/// Starts drags past the activation distance, streams drag-over ticks,
/// and resolves the drop on release.
pub fn bind_global_pointer(dnd: DndSignals, controller: DragController, config: DragConfig) {
    let move_controller = controller.clone();
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        if dnd.keyboard_read.get_untracked() {
            return;
        }
        let Some(pending) = dnd.pending_read.get_untracked() else {
            return;
        };
        let dx = ev.client_x() as f64 - pending.start_x;
        let dy = ev.client_y() as f64 - pending.start_y;

        if dnd.active_read.get_untracked().is_none() {
            if !exceeds_activation(dx, dy, config.activation_distance_px) {
                return;
            }
            move_controller.drag_start(pending.item.clone());
            dnd.active_write.set(Some(pending.item.clone()));
        }
        dnd.offset_write.set((dx, dy));
        move_controller.drag_over(dnd.current_event(&pending));
    });

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        if dnd.keyboard_read.get_untracked() {
            return;
        }
        let pending = dnd.pending_read.get_untracked();
        match (pending, dnd.active_read.get_untracked()) {
            (Some(pending), Some(_)) => {
                let event = dnd.current_event(&pending);
                end_drag(&dnd);
                controller.drag_end(event);
            }
            _ => {
                // Not dragging: the click fires naturally on the element
                dnd.pending_write.set(None);
            }
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }
    on_mousemove.forget();
    on_mouseup.forget();
}

/// Create keydown handler for a focusable draggable.
/// Enter/Space picks up and drops, arrows move, Escape cancels.
pub fn make_on_keydown(
    dnd: DndSignals,
    controller: DragController,
    item: DragItem,
    config: DragConfig,
) -> impl Fn(web_sys::KeyboardEvent) + Clone + 'static {
    move |ev: web_sys::KeyboardEvent| {
        if dom::is_form_control(&ev) {
            return;
        }
        let Some(action) = key_action(&ev.key(), config.keyboard_step_px) else {
            return;
        };
        let keyboard_drag = dnd
            .pending_read
            .get_untracked()
            .filter(|pending| dnd.keyboard_read.get_untracked() && pending.item == item);

        match (action, keyboard_drag) {
            (KeyAction::Toggle, None) => {
                if dnd.active_read.get_untracked().is_some() {
                    return;
                }
                let Some(origin) = dom::current_target_rect(&ev) else {
                    return;
                };
                ev.prevent_default();
                dnd.keyboard_write.set(true);
                dnd.pending_write.set(Some(PendingDrag {
                    item: item.clone(),
                    start_x: origin.left,
                    start_y: origin.top,
                    origin,
                }));
                dnd.active_write.set(Some(item.clone()));
                controller.drag_start(item.clone());
            }
            (KeyAction::Toggle, Some(pending)) => {
                ev.prevent_default();
                let event = dnd.current_event(&pending);
                end_drag(&dnd);
                controller.drag_end(event);
            }
            (KeyAction::Nudge { dx, dy }, Some(pending)) => {
                ev.prevent_default();
                dnd.offset_write.update(|(x, y)| {
                    *x += dx;
                    *y += dy;
                });
                controller.drag_over(dnd.current_event(&pending));
            }
            (KeyAction::Cancel, Some(_)) => {
                ev.prevent_default();
                controller.cancel();
                end_drag(&dnd);
            }
            _ => {}
        }
    }
}
