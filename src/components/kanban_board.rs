//! Kanban Board Component
//!
//! Board header, the columns in position order, and the add-column form.

use leptos::prelude::*;

use crate::components::{InlineAddForm, KanbanColumn};
use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn KanbanBoard() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let column_ids = Memo::new(move |_| {
        store
            .columns()
            .with(|columns| columns.iter().map(|column| column.id().to_string()).collect::<Vec<_>>())
    });

    let on_add_column = {
        let ctx = ctx.clone();
        Callback::new(move |title: String| {
            ctx.mutate(move |reconciler| async move { reconciler.create_column(&title).await });
        })
    };

    let retry = {
        let ctx = ctx.clone();
        move |_| ctx.reload()
    };

    let board_style = move || {
        store
            .board_color()
            .get()
            .map(|color| format!("background-color: {};", color))
            .unwrap_or_default()
    };

    view! {
        <div class="kanban-board" style=board_style>
            <header class="kanban-board-header">
                <h1>{move || store.board_title().get()}</h1>
                <Show when=move || store.loading().get()>
                    <span class="loading-indicator">"Loading…"</span>
                </Show>
            </header>

            {move || store.error().get().map(|error| {
                let retry = retry.clone();
                view! {
                    <div class="board-error">
                        <span>{error}</span>
                        <button on:click=retry>"Retry"</button>
                    </div>
                }
            })}

            <div class="kanban-columns" data-columns-key=move || store.columns_key().get()>
                <For
                    each=move || column_ids.get()
                    key=|id: &String| id.clone()
                    children=move |id: String| view! { <KanbanColumn column_id=id /> }
                />
                <div class="kanban-add-column">
                    <InlineAddForm button_label="+ Add column" placeholder="Column title" on_submit=on_add_column />
                </div>
            </div>
        </div>
    }
}
