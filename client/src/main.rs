mod api;
mod app;
mod backoff;
mod board;
mod config;
mod dispatch;
mod identity;
mod log;
mod session;
mod transfer;
mod waiter;

use leptos::mount::mount_to;
use leptos::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use app::App;
use config::{ClientConfig, MOUNT_ELEMENT_ID};

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id(MOUNT_ELEMENT_ID)
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        return;
    };

    let config = match ClientConfig::from_element(&target) {
        Ok(config) => config,
        Err(e) => {
            log::error(&format!("cannot start puzzle client: {e}"));
            return;
        }
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // A second mount would start a second waiter against the same cursor.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
