//! Toast List Component

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::toast::dismiss_toast;

/// Stack of transient notifications, newest last
#[component]
pub fn ToastList() -> impl IntoView {
    let toasts = use_app_context().toasts;

    view! {
        <div class="toast-list" role="status">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let class = toast.class();
                    view! {
                        <div class=class on:click=move |_| dismiss_toast(toasts, id)>
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
