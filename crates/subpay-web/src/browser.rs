//! Browser Helpers

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}
