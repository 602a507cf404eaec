//! Kanban Task Component
//!
//! A draggable task card. Cards are also drop targets so hovering another
//! card picks the insertion point.

use leptos::prelude::*;
use leptos_kanban_dnd::{kind_attr, make_on_keydown, make_on_mousedown};
use taskwave_board::{DragItem, ItemKind, Priority, TaskPatch};

use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::store::{store_task, use_app_store};

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "priority-badge priority-low",
        Priority::Normal => "priority-badge priority-normal",
        Priority::High => "priority-badge priority-high",
        Priority::Urgent => "priority-badge priority-urgent",
    }
}

#[component]
pub fn KanbanTask(task_id: String) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = ctx.dnd;

    let task = {
        let task_id = task_id.clone();
        Memo::new(move |_| store_task(&store, &task_id))
    };

    let item = DragItem::task(task_id.clone());
    let on_mousedown = make_on_mousedown(dnd, item.clone());
    let on_keydown = make_on_keydown(dnd, ctx.drag_controller(), item, ctx.drag_config);

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let card_class = {
        let task_id = task_id.clone();
        move || {
            let mut class = String::from("task-card");
            if task.with(|task| task.as_ref().is_some_and(|task| task.completed)) {
                class.push_str(" completed");
            }
            if dnd.is_active(&task_id) {
                class.push_str(" dragging");
            }
            if dnd.is_over(&task_id) {
                class.push_str(" drop-target");
            }
            class
        }
    };

    let toggle = {
        let ctx = ctx.clone();
        let task_id = task_id.clone();
        move |_| {
            let task_id = task_id.clone();
            ctx.mutate(move |reconciler| async move { reconciler.toggle_task_completion(&task_id).await });
        }
    };

    // The click that ends a drag must not open the editor
    let start_edit = move |_| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        set_draft.set(task.with_untracked(|task| task.as_ref().map(|task| task.title.clone()).unwrap_or_default()));
        set_editing.set(true);
    };

    let save_edit = {
        let ctx = ctx.clone();
        let task_id = task_id.clone();
        move || {
            set_editing.set(false);
            let title = draft.get_untracked().trim().to_string();
            let unchanged = task.with_untracked(|task| task.as_ref().is_none_or(|task| task.title == title));
            if title.is_empty() || unchanged {
                return;
            }
            let task_id = task_id.clone();
            ctx.mutate(move |reconciler| async move {
                let patch = TaskPatch {
                    title: Some(title),
                    ..Default::default()
                };
                reconciler.edit_task(&task_id, patch).await
            });
        }
    };
    let save_on_blur = save_edit.clone();

    let on_delete = {
        let ctx = ctx.clone();
        let task_id = task_id.clone();
        Callback::new(move |_| {
            let task_id = task_id.clone();
            ctx.mutate(move |reconciler| async move { reconciler.delete_task(&task_id).await });
        })
    };

    view! {
        <div
            class=card_class
            data-dnd-id=task_id.clone()
            data-dnd-kind=kind_attr(ItemKind::Task)
            tabindex="0"
            on:mousedown=on_mousedown
            on:keydown=on_keydown
        >
            <div class="task-card-row">
                <input
                    type="checkbox"
                    class="task-checkbox"
                    prop:checked=move || task.with(|task| task.as_ref().is_some_and(|task| task.completed))
                    on:change=toggle
                />
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <span class="task-title" on:dblclick=start_edit>
                            {move || task.with(|task| task.as_ref().map(|task| task.title.clone()).unwrap_or_default())}
                        </span>
                    }
                >
                    <input
                        type="text"
                        class="task-title-input"
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
                <DeleteConfirmButton button_class="task-delete-btn" label="task" on_confirm=on_delete />
            </div>
            <div class="task-meta">
                {move || task.with(|task| task.as_ref().map(|task| {
                    let label = format!("{:?}", task.priority).to_uppercase();
                    view! { <span class=priority_class(task.priority)>{label}</span> }
                }))}
                {move || task.with(|task| task.as_ref().and_then(|task| task.due_date).map(|due| {
                    view! { <span class="task-due">{due.format("%b %d").to_string()}</span> }
                }))}
                {move || task.with(|task| task.as_ref().filter(|task| !task.labels.is_empty()).map(|task| {
                    view! { <span class="task-labels">{task.labels.join(", ")}</span> }
                }))}
            </div>
        </div>
    }
}
