//! Kanban Column Component
//!
//! Column header is the drag handle and a drop target; a footer zone
//! below the tasks accepts drops at the end of the column.

use leptos::prelude::*;
use leptos_kanban_dnd::{kind_attr, make_on_keydown, make_on_mousedown};
use taskwave_board::position::Direction;
use taskwave_board::{ColumnPatch, DragItem, ItemKind, NewTask, Task};

use crate::components::{DeleteConfirmButton, InlineAddForm, KanbanTask};
use crate::context::use_app_context;
use crate::store::{store_column, store_column_nav, use_app_store};

#[component]
pub fn KanbanColumn(column_id: String) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = ctx.dnd;

    let column = {
        let column_id = column_id.clone();
        Memo::new(move |_| store_column(&store, &column_id))
    };
    let nav = {
        let column_id = column_id.clone();
        Memo::new(move |_| store_column_nav(&store, &column_id))
    };
    let tasks = Memo::new(move |_| column.with(|column| column.as_ref().map(|column| column.tasks.clone()).unwrap_or_default()));

    let item = DragItem::column(column_id.clone());
    let on_mousedown = make_on_mousedown(dnd, item.clone());
    let on_keydown = make_on_keydown(dnd, ctx.drag_controller(), item, ctx.drag_config);

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let column_class = {
        let column_id = column_id.clone();
        move || {
            if dnd.is_active(&column_id) {
                "kanban-column dragging"
            } else if dnd.is_over(&column_id) {
                "kanban-column drop-target"
            } else {
                "kanban-column"
            }
        }
    };

    let shift = {
        let ctx = ctx.clone();
        let column_id = column_id.clone();
        move |direction: Direction| {
            let column_id = column_id.clone();
            ctx.mutate(move |reconciler| async move { reconciler.move_column_by(&column_id, direction).await });
        }
    };
    let shift_left = shift.clone();
    let shift_right = shift;

    let start_edit = move |_| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        set_draft.set(column.with_untracked(|column| column.as_ref().map(|column| column.column.title.clone()).unwrap_or_default()));
        set_editing.set(true);
    };

    let save_edit = {
        let ctx = ctx.clone();
        let column_id = column_id.clone();
        move || {
            set_editing.set(false);
            let title = draft.get_untracked().trim().to_string();
            let unchanged = column.with_untracked(|column| column.as_ref().is_none_or(|column| column.column.title == title));
            if title.is_empty() || unchanged {
                return;
            }
            let column_id = column_id.clone();
            ctx.mutate(move |reconciler| async move {
                let patch = ColumnPatch {
                    title: Some(title),
                    ..Default::default()
                };
                reconciler.edit_column(&column_id, patch).await
            });
        }
    };
    let save_on_blur = save_edit.clone();

    let on_delete = {
        let ctx = ctx.clone();
        let column_id = column_id.clone();
        Callback::new(move |_| {
            let column_id = column_id.clone();
            ctx.mutate(move |reconciler| async move { reconciler.delete_column(&column_id).await });
        })
    };

    let on_add_task = {
        let ctx = ctx.clone();
        let column_id = column_id.clone();
        Callback::new(move |title: String| {
            let task = NewTask::new(column_id.clone(), title);
            ctx.mutate(move |reconciler| async move { reconciler.create_task(task).await });
        })
    };

    view! {
        <section class=column_class>
            <header
                class="kanban-column-header"
                style=move || column.with(|column| {
                    column
                        .as_ref()
                        .and_then(|column| column.column.color.clone())
                        .map(|color| format!("border-top-color: {};", color))
                        .unwrap_or_default()
                })
                data-dnd-id=column_id.clone()
                data-dnd-kind=kind_attr(ItemKind::Column)
                tabindex="0"
                on:mousedown=on_mousedown
                on:keydown=on_keydown
            >
                <button
                    class="column-nav-btn"
                    title="Move left"
                    disabled=move || !nav.get().can_move_left
                    on:click=move |ev| {
                        ev.stop_propagation();
                        shift_left(Direction::Left);
                    }
                >
                    "←"
                </button>
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <h2 class="kanban-column-title" on:dblclick=start_edit>
                            {move || column.with(|column| column.as_ref().map(|column| column.column.title.clone()).unwrap_or_default())}
                        </h2>
                    }
                >
                    <input
                        type="text"
                        class="column-title-input"
                        autofocus=true
                        prop:value=move || draft.get()
                        on:input=move |ev| set_draft.set(event_target_value(&ev))
                        on:blur={
                            let save = save_on_blur.clone();
                            move |_| save()
                        }
                        on:keydown={
                            let save = save_edit.clone();
                            move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                                "Enter" => save(),
                                "Escape" => set_editing.set(false),
                                _ => {}
                            }
                        }
                    />
                </Show>
                <span class="kanban-column-count">{move || tasks.with(Vec::len)}</span>
                <button
                    class="column-nav-btn"
                    title="Move right"
                    disabled=move || !nav.get().can_move_right
                    on:click=move |ev| {
                        ev.stop_propagation();
                        shift_right(Direction::Right);
                    }
                >
                    "→"
                </button>
                <DeleteConfirmButton button_class="column-delete-btn" label="column" on_confirm=on_delete />
            </header>

            <div class="kanban-task-list">
                <For
                    each=move || tasks.get()
                    key=|task: &Task| task.id.clone()
                    children=move |task: Task| view! { <KanbanTask task_id=task.id /> }
                />
            </div>

            <div
                class="kanban-column-footer"
                data-dnd-id=column_id.clone()
                data-dnd-kind=kind_attr(ItemKind::Column)
            >
                <InlineAddForm button_label="+ Add task" placeholder="Task title" on_submit=on_add_task />
            </div>
        </section>
    }
}
