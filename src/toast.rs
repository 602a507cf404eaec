//! Toast Notifications
//!
//! [`Notifier`] that shows transient toasts, each removed after the
//! configured duration.

use std::cell::Cell;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use taskwave_board::{NoticeLevel, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

impl Toast {
    pub fn class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "toast toast-success",
            NoticeLevel::Info => "toast toast-info",
            NoticeLevel::Error => "toast toast-error",
        }
    }
}

pub struct ToastNotifier {
    toasts: RwSignal<Vec<Toast>>,
    duration_ms: u32,
    next_id: Cell<u64>,
}

impl ToastNotifier {
    pub fn new(toasts: RwSignal<Vec<Toast>>, duration_ms: u32) -> Self {
        Self {
            toasts,
            duration_ms,
            next_id: Cell::new(0),
        }
    }
}

/// Remove one toast by id
pub fn dismiss_toast(toasts: RwSignal<Vec<Toast>>, id: u64) {
    toasts.update(|list| list.retain(|toast| toast.id != id));
}

impl Notifier for ToastNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.toasts.update(|list| {
            list.push(Toast {
                id,
                level,
                message: message.to_string(),
            })
        });

        let toasts = self.toasts;
        Timeout::new(self.duration_ms, move || dismiss_toast(toasts, id)).forget();
    }
}
