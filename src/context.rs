//! Application Context
//!
//! Shared state provided via Leptos Context API.

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_kanban_dnd::{DndSignals, DragConfig};
use rolling_logger::LogBuffer;
use taskwave_board::{BoardReconciler, DragController, ReconcileOutcome};

use crate::toast::Toast;

/// App-wide handles provided via context
#[derive(Clone)]
pub struct AppContext {
    /// Optimistic mutations; single-threaded, so stored locally
    reconciler: StoredValue<BoardReconciler, LocalStorage>,
    /// Drag session fed by the sensors
    pub controller: StoredValue<DragController, LocalStorage>,
    pub dnd: DndSignals,
    pub drag_config: DragConfig,
    pub toasts: RwSignal<Vec<Toast>>,
    pub logs: LogBuffer,
}

impl AppContext {
    pub fn new(
        reconciler: BoardReconciler,
        controller: DragController,
        dnd: DndSignals,
        drag_config: DragConfig,
        toasts: RwSignal<Vec<Toast>>,
        logs: LogBuffer,
    ) -> Self {
        Self {
            reconciler: StoredValue::new_local(reconciler),
            controller: StoredValue::new_local(controller),
            dnd,
            drag_config,
            toasts,
            logs,
        }
    }

    pub fn reconciler(&self) -> BoardReconciler {
        self.reconciler.get_value()
    }

    pub fn drag_controller(&self) -> DragController {
        self.controller.get_value()
    }

    /// Run a mutation in the background
    pub fn mutate<F, Fut>(&self, action: F)
    where
        F: FnOnce(BoardReconciler) -> Fut,
        Fut: Future<Output = ReconcileOutcome> + 'static,
    {
        let future = action(self.reconciler());
        spawn_local(async move {
            let outcome = future.await;
            tracing::debug!(?outcome, "mutation settled");
        });
    }

    /// Refetch the board
    pub fn reload(&self) {
        let reconciler = self.reconciler();
        spawn_local(async move {
            let _ = reconciler.refresh().await;
        });
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
