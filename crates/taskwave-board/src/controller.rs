//! Drag Controller
//!
//! Glue between pointer/keyboard sensors and the board: owns the
//! [`DragSession`], reads the current enriched columns from the store, and
//! hands resulting intents to a sink (normally the reconciler).
//!
//! Drag-over events are coalesced per animation frame; drag-end is resolved
//! immediately and folds in any drag-over still waiting for its frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::schedule::{FrameCoalescer, FrameScheduler};
use crate::session::{DragEndEvent, DragIntent, DragItem, DragOverEvent, DragSession};
use crate::store::BoardStore;

struct ControllerInner {
    session: RefCell<DragSession>,
    store: BoardStore,
    sink: Rc<dyn Fn(DragIntent)>,
    coalescer: FrameCoalescer<DragOverEvent>,
}

impl ControllerInner {
    fn resolve_over(&self, event: &DragOverEvent) {
        let intent = {
            let session = self.session.borrow();
            if !session.is_dragging() {
                return;
            }
            session.drag_over(&self.store.enriched_columns(), event)
        };
        if let Some(intent) = intent {
            (self.sink)(intent);
        }
    }
}

#[derive(Clone)]
pub struct DragController {
    inner: Rc<ControllerInner>,
}

impl DragController {
    pub fn new(store: BoardStore, scheduler: Rc<dyn FrameScheduler>, sink: impl Fn(DragIntent) + 'static) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<ControllerInner>| {
            let weak = weak.clone();
            let coalescer = FrameCoalescer::new(scheduler, move |event: DragOverEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.resolve_over(&event);
                }
            });
            ControllerInner {
                session: RefCell::new(DragSession::new()),
                store,
                sink: Rc::new(sink),
                coalescer,
            }
        });
        Self { inner }
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.session.borrow().is_dragging()
    }

    pub fn active(&self) -> Option<DragItem> {
        self.inner.session.borrow().active().cloned()
    }

    pub fn drag_start(&self, item: DragItem) {
        self.inner.coalescer.clear();
        self.inner.session.borrow_mut().start(item);
    }

    /// Queue a pointer tick; only the latest per frame is resolved
    pub fn drag_over(&self, event: DragOverEvent) {
        if self.is_dragging() {
            self.inner.coalescer.push(event);
        }
    }

    /// Resolve the drop and forward its intent, if any.
    ///
    /// A drag-over still waiting for its frame is resolved at the drop point
    /// and used when the drop itself yields nothing, so a task released over
    /// a task in another column still moves.
    pub fn drag_end(&self, event: DragEndEvent) -> Option<DragIntent> {
        let over_pending = self.inner.coalescer.has_pending();
        self.inner.coalescer.clear();
        let columns = self.inner.store.enriched_columns();
        let deferred = if over_pending {
            self.inner.session.borrow().drag_over(&columns, &event)
        } else {
            None
        };
        let intent = self.inner.session.borrow_mut().end(&columns, &event).or(deferred);
        if let Some(intent) = &intent {
            (self.inner.sink)(intent.clone());
        }
        intent
    }

    pub fn cancel(&self) {
        self.inner.coalescer.clear();
        self.inner.session.borrow_mut().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Rect;
    use crate::models::{Column, ItemKind, Task, TaskDestination};
    use crate::schedule::ManualScheduler;
    use crate::session::OverTarget;

    fn make_store() -> BoardStore {
        let store = BoardStore::new();
        store.update(|state| {
            state.columns = vec![
                Column::new("c1", "b1", "Todo", 1),
                Column::new("c2", "b1", "Doing", 2),
                Column::new("c3", "b1", "Done", 3),
            ];
            state.tasks = vec![Task::new("t1", "c1", "a", 0), Task::new("t2", "c2", "b", 0)];
        });
        store
    }

    fn over_column(id: &str) -> DragOverEvent {
        DragOverEvent {
            over: Some(OverTarget {
                id: id.to_string(),
                kind: ItemKind::Column,
                rect: Rect::default(),
            }),
            active_translated_top: None,
        }
    }

    fn over_task(id: &str, top: f64, active_top: f64) -> DragOverEvent {
        DragOverEvent {
            over: Some(OverTarget {
                id: id.to_string(),
                kind: ItemKind::Task,
                rect: Rect::new(0.0, top, 200.0, 40.0),
            }),
            active_translated_top: Some(active_top),
        }
    }

    fn make_controller() -> (DragController, ManualScheduler, Rc<RefCell<Vec<DragIntent>>>) {
        let scheduler = ManualScheduler::new();
        let intents = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&intents);
        let controller = DragController::new(make_store(), Rc::new(scheduler.clone()), move |intent| {
            sink.borrow_mut().push(intent)
        });
        (controller, scheduler, intents)
    }

    fn destinations(intents: &[DragIntent]) -> Vec<TaskDestination> {
        intents
            .iter()
            .filter_map(|intent| match intent {
                DragIntent::MoveTask { to, .. } => Some(to.clone()),
                DragIntent::ReorderColumns { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_drag_over_coalesced_to_latest_per_frame() {
        let (controller, scheduler, intents) = make_controller();
        controller.drag_start(DragItem::task("t1"));

        controller.drag_over(over_column("c2"));
        controller.drag_over(over_column("c3"));
        assert!(intents.borrow().is_empty());

        scheduler.run_frame();
        assert_eq!(destinations(&intents.borrow()), vec![TaskDestination::new("c3", 0)]);
    }

    #[test]
    fn test_drag_end_discards_pending_over() {
        let (controller, scheduler, intents) = make_controller();
        controller.drag_start(DragItem::task("t1"));
        controller.drag_over(over_column("c3"));

        let intent = controller.drag_end(over_column("c2"));
        scheduler.run_frame();

        assert!(intent.is_some());
        assert_eq!(destinations(&intents.borrow()), vec![TaskDestination::new("c2", 1)]);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drop_on_task_in_other_column_before_frame_still_moves() {
        let (controller, scheduler, intents) = make_controller();
        controller.drag_start(DragItem::task("t1"));
        controller.drag_over(over_task("t2", 100.0, 80.0));

        let intent = controller.drag_end(over_task("t2", 100.0, 80.0));
        scheduler.run_frame();

        assert!(intent.is_some());
        assert_eq!(destinations(&intents.borrow()), vec![TaskDestination::new("c2", 0)]);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drop_on_task_in_other_column_after_frame_is_not_repeated() {
        let (controller, scheduler, intents) = make_controller();
        controller.drag_start(DragItem::task("t1"));
        controller.drag_over(over_task("t2", 100.0, 120.0));
        scheduler.run_frame();

        assert_eq!(controller.drag_end(over_task("t2", 100.0, 120.0)), None);
        assert_eq!(destinations(&intents.borrow()), vec![TaskDestination::new("c2", 1)]);
    }

    #[test]
    fn test_events_ignored_when_idle() {
        let (controller, scheduler, intents) = make_controller();
        controller.drag_over(over_column("c2"));
        scheduler.run_frame();
        assert_eq!(controller.drag_end(over_column("c2")), None);
        assert!(intents.borrow().is_empty());
    }

    #[test]
    fn test_cancel_resets_without_intent() {
        let (controller, scheduler, intents) = make_controller();
        controller.drag_start(DragItem::task("t1"));
        assert_eq!(controller.active(), Some(DragItem::task("t1")));
        controller.drag_over(over_column("c2"));
        controller.cancel();
        scheduler.run_frame();

        assert!(intents.borrow().is_empty());
        assert_eq!(controller.active(), None);
    }
}
