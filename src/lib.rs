/// Workspace Tabs - Chrome Extension background coordinator
/// Built with Rust + WASM

pub mod browser;
pub mod chrome;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod messages;
pub mod operations;
pub mod storage;
#[cfg(test)]
mod testing;
pub mod urls;
pub mod workspace_data;

use std::rc::Rc;

use chrome::{to_js, ChromeStorage, ChromeTabs, WorkerTimers};
use config::CoordinatorConfig;
use coordinator::Coordinator;
use debounce::Debouncer;
use log::{debug, error, info};
use messages::{MessageSender, Request};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

type ChromeCoordinator = Coordinator<ChromeStorage, ChromeTabs>;

/// Everything the service worker keeps alive between events
struct Background {
    coordinator: Rc<ChromeCoordinator>,
    tab_removed: Debouncer<WorkerTimers>,
}

impl Background {
    fn new() -> Self {
        let config = CoordinatorConfig::default();
        let debounce_ms = config.tab_removed_debounce_ms;
        Background {
            coordinator: Rc::new(Coordinator::new(ChromeStorage, ChromeTabs, config)),
            tab_removed: Debouncer::new(WorkerTimers, debounce_ms),
        }
    }
}

thread_local! {
    static BACKGROUND: Rc<Background> = Rc::new(Background::new());
}

fn background() -> Rc<Background> {
    BACKGROUND.with(Rc::clone)
}

fn coordinator() -> Rc<ChromeCoordinator> {
    Rc::clone(&background().coordinator)
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    info!("Background service worker initialized");
}

#[wasm_bindgen]
pub fn on_installed() {
    let coordinator = coordinator();
    spawn_local(async move { coordinator.on_installed().await });
}

#[wasm_bindgen]
pub fn on_startup() {
    let coordinator = coordinator();
    spawn_local(async move { coordinator.on_startup().await });
}

#[wasm_bindgen]
pub fn on_suspend() {
    let coordinator = coordinator();
    spawn_local(async move { coordinator.on_suspend().await });
}

// Closing several tabs (or a window) fires one event per tab
#[wasm_bindgen]
pub fn on_tab_removed() {
    let background = background();
    let coordinator = Rc::clone(&background.coordinator);
    let scheduled = background.tab_removed.trigger(move || {
        spawn_local(async move { coordinator.on_tabs_removed().await });
    });
    if let Err(e) = scheduled {
        error!("Failed to schedule tab snapshot: {}", e);
    }
}

/// Resolves to the response object, or `undefined` for messages this
/// worker does not handle
#[wasm_bindgen]
pub async fn handle_message(message: JsValue, sender: JsValue) -> JsValue {
    let request: Request = match serde_wasm_bindgen::from_value(message) {
        Ok(request) => request,
        Err(e) => {
            debug!("Ignoring message: {}", e);
            return JsValue::UNDEFINED;
        }
    };
    let sender: MessageSender = serde_wasm_bindgen::from_value(sender).unwrap_or_default();

    let response = coordinator().handle_message(request, &sender).await;
    to_js(&response).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        JsValue::UNDEFINED
    })
}
