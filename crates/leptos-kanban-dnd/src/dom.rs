//! DOM Measurement
//!
//! Droppables are any element carrying `data-dnd-id` and `data-dnd-kind`
//! attributes. They are measured fresh on every pointer tick.

use std::cell::RefCell;
use std::rc::Rc;

use taskwave_board::{Droppable, FrameScheduler, ItemKind, Rect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub const ID_ATTR: &str = "data-dnd-id";
pub const KIND_ATTR: &str = "data-dnd-kind";

pub fn kind_attr(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Column => "column",
        ItemKind::Task => "task",
    }
}

fn parse_kind(value: &str) -> Option<ItemKind> {
    match value {
        "column" => Some(ItemKind::Column),
        "task" => Some(ItemKind::Task),
        _ => None,
    }
}

pub fn element_rect(element: &web_sys::Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Every registered droppable in the document with its current client rect
pub fn measure_droppables() -> Vec<Droppable> {
    let Some(document) = web_sys::window().and_then(|win| win.document()) else {
        return Vec::new();
    };
    let Ok(nodes) = document.query_selector_all(&format!("[{}][{}]", ID_ATTR, KIND_ATTR)) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .filter_map(|element| {
            let id = element.get_attribute(ID_ATTR)?;
            let kind = parse_kind(&element.get_attribute(KIND_ATTR)?)?;
            Some(Droppable {
                id,
                kind,
                rect: element_rect(&element),
            })
        })
        .collect()
}

/// Rect of the element an event listener is attached to
pub fn current_target_rect(event: &web_sys::Event) -> Option<Rect> {
    event
        .current_target()
        .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        .map(|element| element_rect(&element))
}

/// Whether the event started inside a form control, where presses stay clicks
pub fn is_form_control(event: &web_sys::Event) -> bool {
    event.target().is_some_and(|target| {
        target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
    })
}

type QueuedFrame = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

/// Run a queued frame callback at most once
fn run_queued(slot: &QueuedFrame) {
    let callback = slot.borrow_mut().take();
    if let Some(callback) = callback {
        callback();
    }
}

/// `requestAnimationFrame`-backed scheduler
#[derive(Debug, Default, Clone, Copy)]
pub struct AnimationFrameScheduler;

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        let Some(win) = web_sys::window() else {
            callback();
            return;
        };
        // Whichever path runs first takes the callback
        let pending = Rc::new(RefCell::new(Some(callback)));
        let queued = Rc::clone(&pending);
        let cb = Closure::once_into_js(move || run_queued(&queued));
        if win.request_animation_frame(cb.unchecked_ref()).is_err() {
            tracing::warn!("requestAnimationFrame unavailable, running frame inline");
            run_queued(&pending);
        }
    }
}
