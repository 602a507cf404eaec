//! Taskwave Frontend Entry Point

mod app;
mod commands;
mod components;
mod config;
mod context;
mod store;
mod toast;

use app::App;
use leptos::prelude::*;
use rolling_logger::{init_logger, LogBuffer, LoggerConfig};

use crate::config::ClientConfig;

fn main() {
    console_error_panic_hook::set_once();

    let logs = init_logger(LoggerConfig::default()).unwrap_or_else(|err| {
        web_sys::console::warn_1(&format!("logger not installed: {}", err).into());
        LogBuffer::default()
    });
    let config = ClientConfig::default();

    mount_to_body(move || view! { <App config=config.clone() logs=logs.clone() /> });
}
