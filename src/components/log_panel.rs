//! Log Panel Component
//!
//! Collapsible view of the rolling log buffer.

use leptos::prelude::*;

use crate::context::use_app_context;

#[component]
pub fn LogPanel() -> impl IntoView {
    let logs = use_app_context().logs;
    let (open, set_open) = signal(false);
    let (refresh, set_refresh) = signal(0u32);

    let text = move || {
        let _ = refresh.get();
        logs.render()
    };

    view! {
        <footer class="log-panel">
            <button class="log-toggle" on:click=move |_| set_open.update(|v| *v = !*v)>
                {move || if open.get() { "Hide logs" } else { "Show logs" }}
            </button>
            <Show when=move || open.get()>
                <button class="log-refresh" on:click=move |_| set_refresh.update(|v| *v += 1)>"Refresh"</button>
                <pre class="log-lines">{text.clone()}</pre>
            </Show>
        </footer>
    }
}
