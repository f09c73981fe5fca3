//! Razorpay Checkout Widget
//!
//! Bindings for the hosted `checkout.js` script. The widget reports back
//! through JS callbacks; those feed a oneshot channel so `open` can simply be
//! awaited.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use js_sys::{Function, Object, Promise, Reflect};
use leptos::logging;
use wasm_bindgen::{JsCast, JsValue, prelude::*};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

use crate::checkout::{CheckoutError, CheckoutGateway, CheckoutOptions};
use crate::config::CHECKOUT_SCRIPT_URL;

#[wasm_bindgen]
extern "C" {
    /// `window.Razorpay`
    type Razorpay;

    #[wasm_bindgen(constructor, catch)]
    fn new(options: &JsValue) -> Result<Razorpay, JsValue>;

    #[wasm_bindgen(method)]
    fn open(this: &Razorpay);

    #[wasm_bindgen(method)]
    fn on(this: &Razorpay, event: &str, handler: &JsValue);
}

type Outcome = Result<String, CheckoutError>;

/// Resolves the pending `open` call exactly once
#[derive(Clone)]
struct Completion(Rc<RefCell<Option<oneshot::Sender<Outcome>>>>);

impl Completion {
    fn new() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (Self(Rc::new(RefCell::new(Some(tx)))), rx)
    }

    fn finish(&self, outcome: Outcome) {
        if let Some(tx) = self.0.borrow_mut().take() {
            let _ = tx.send(outcome);
        }
    }
}

fn js_error(err: &JsValue) -> CheckoutError {
    CheckoutError::Widget(
        err.as_string()
            .or_else(|| js_sys::JSON::stringify(err).ok().map(String::from))
            .unwrap_or_else(|| "unknown error".into()),
    )
}

fn widget_present() -> bool {
    web_sys::window()
        .is_some_and(|w| Reflect::has(&w, &JsValue::from_str("Razorpay")).unwrap_or(false))
}

/// Append the checkout script to `<body>` and wait for it to load or fail
async fn inject_script() -> Result<bool, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(CHECKOUT_SCRIPT_URL);

    let loaded = Promise::new(&mut |resolve: Function, _reject: Function| {
        let on_error = resolve.clone();
        let onload = Closure::once_into_js(move || {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::TRUE);
        });
        let onerror = Closure::once_into_js(move || {
            let _ = on_error.call1(&JsValue::NULL, &JsValue::FALSE);
        });
        script.set_onload(Some(onload.unchecked_ref()));
        script.set_onerror(Some(onerror.unchecked_ref()));
    });

    body.append_child(&script)?;

    Ok(JsFuture::from(loaded).await?.as_bool().unwrap_or(false))
}

/// Widget configuration as a JS object, with the callbacks attached
fn build_options(
    options: &CheckoutOptions,
    completion: &Completion,
) -> Result<JsValue, CheckoutError> {
    let json =
        serde_json::to_string(options).map_err(|e| CheckoutError::Widget(e.to_string()))?;
    let config = js_sys::JSON::parse(&json).map_err(|e| js_error(&e))?;

    let on_success = completion.clone();
    let handler = Closure::once_into_js(move |response: JsValue| {
        let payload = js_sys::JSON::stringify(&response)
            .map(String::from)
            .map_err(|e| js_error(&e));
        on_success.finish(payload);
    });
    Reflect::set(&config, &"handler".into(), &handler).map_err(|e| js_error(&e))?;

    let on_dismiss = completion.clone();
    let ondismiss = Closure::once_into_js(move || {
        on_dismiss.finish(Err(CheckoutError::WidgetDismissed));
    });
    let modal = Object::new();
    Reflect::set(&modal, &"ondismiss".into(), &ondismiss).map_err(|e| js_error(&e))?;
    Reflect::set(&config, &"modal".into(), &modal).map_err(|e| js_error(&e))?;

    Ok(config)
}

/// The real hosted widget
pub struct RazorpayWidget;

#[async_trait(?Send)]
impl CheckoutGateway for RazorpayWidget {
    async fn load(&self) -> bool {
        if widget_present() {
            return true;
        }

        match inject_script().await {
            Ok(loaded) => loaded,
            Err(e) => {
                logging::error!("Could not inject checkout script: {:?}", e);
                false
            }
        }
    }

    async fn open(&self, options: &CheckoutOptions) -> Result<String, CheckoutError> {
        let (completion, outcome) = Completion::new();
        let config = build_options(options, &completion)?;

        let widget = Razorpay::new(&config).map_err(|e| js_error(&e))?;

        // The widget stays open after a failed attempt so the user can retry;
        // only log here and let success or dismissal settle the outcome.
        let on_failed = Closure::<dyn FnMut(JsValue)>::new(move |response: JsValue| {
            let description = Reflect::get(&response, &"error".into())
                .and_then(|e| Reflect::get(&e, &"description".into()))
                .ok()
                .and_then(|d| d.as_string())
                .unwrap_or_default();
            logging::error!("Razorpay payment failed: {}", description);
        });
        widget.on("payment.failed", &on_failed.into_js_value());

        widget.open();

        outcome.await.unwrap_or(Err(CheckoutError::WidgetDismissed))
    }
}
