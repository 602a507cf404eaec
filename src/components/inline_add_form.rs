//! Inline Add Form Component
//!
//! Collapsed "+ Add …" button that expands into a one-line form.

use leptos::prelude::*;

/// Form for adding a column or task by title
#[component]
pub fn InlineAddForm(
    #[prop(into)] button_label: String,
    #[prop(into)] placeholder: String,
    #[prop(into)] on_submit: Callback<String>,
) -> impl IntoView {
    let (open, set_open) = signal(false);
    let (text, set_text) = signal(String::new());

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let value = text.get_untracked();
        if value.trim().is_empty() {
            return;
        }
        on_submit.run(value);
        set_text.set(String::new());
        set_open.set(false);
    };

    view! {
        <Show
            when=move || open.get()
            fallback=move || {
                let label = button_label.clone();
                view! {
                    <button type="button" class="add-btn" on:click=move |_| set_open.set(true)>
                        {label}
                    </button>
                }
            }
        >
            <form class="inline-add-form" on:submit=submit>
                <input
                    type="text"
                    placeholder=placeholder.clone()
                    autofocus=true
                    prop:value=move || text.get()
                    on:input=move |ev| set_text.set(event_target_value(&ev))
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        if ev.key() == "Escape" {
                            set_text.set(String::new());
                            set_open.set(false);
                        }
                    }
                />
                <button type="submit">"Add"</button>
                <button type="button" class="cancel-btn" on:click=move |_| set_open.set(false)>"✗"</button>
            </form>
        </Show>
    }
}
