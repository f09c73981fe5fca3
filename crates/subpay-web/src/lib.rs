//! subpay Web Frontend
//!
//! Leptos-based WASM subscription checkout page backed by Razorpay's hosted
//! checkout widget.

mod api;
mod app;
mod browser;
mod checkout;
mod components;
mod config;
mod pages;
mod razorpay;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
