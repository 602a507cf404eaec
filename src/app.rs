//! Taskwave Frontend App
//!
//! Wires the board core to the UI: API client, canonical store,
//! reconciler, drag controller and the reactive view store.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_kanban_dnd::{bind_global_pointer, create_dnd_signals, AnimationFrameScheduler};
use reactive_stores::Store;
use rolling_logger::LogBuffer;
use taskwave_board::{BoardApi, BoardReconciler, BoardStore, DragController, InMemoryBoardApi, Notifier};

use crate::commands::HttpBoardApi;
use crate::components::{DragOverlay, KanbanBoard, LogPanel, ToastList};
use crate::config::{current_board_id, load_token, ClientConfig};
use crate::context::AppContext;
use crate::store::{bind_board_store, AppState};
use crate::toast::{Toast, ToastNotifier};

/// API backend for this session: the server when logged in, memory otherwise
fn board_api(config: &ClientConfig, board_id: &str) -> Rc<dyn BoardApi> {
    match load_token(config) {
        Some(token) if !config.offline => Rc::new(HttpBoardApi::new(config.clone(), Some(token))),
        _ => {
            tracing::info!(board = %board_id, "no session, serving the board from memory");
            Rc::new(InMemoryBoardApi::seeded(board_id))
        }
    }
}

#[component]
pub fn App(config: ClientConfig, logs: LogBuffer) -> impl IntoView {
    let board_id = current_board_id();
    let api = board_api(&config, &board_id);

    let board = BoardStore::new();
    let toasts = RwSignal::new(Vec::<Toast>::new());
    let notifier: Rc<dyn Notifier> = Rc::new(ToastNotifier::new(toasts, config.toast_duration_ms));
    let reconciler = BoardReconciler::new(board_id, api, board.clone(), notifier);

    // Drag intents go straight to the reconciler
    let sink = reconciler.clone();
    let controller = DragController::new(board.clone(), Rc::new(AnimationFrameScheduler), move |intent| {
        let reconciler = sink.clone();
        spawn_local(async move {
            let outcome = reconciler.apply_intent(intent).await;
            tracing::debug!(?outcome, "drag intent settled");
        });
    });

    let store = Store::new(AppState::new());
    bind_board_store(&board, store);
    provide_context(store);

    let dnd = create_dnd_signals();
    bind_global_pointer(dnd, controller.clone(), config.drag);
    provide_context(AppContext::new(reconciler.clone(), controller, dnd, config.drag, toasts, logs));

    spawn_local(async move {
        let _ = reconciler.load().await;
    });

    view! {
        <div class="app-layout">
            <main class="main-content">
                <KanbanBoard />
            </main>
            <DragOverlay />
            <ToastList />
            <LogPanel />
        </div>
    }
}
