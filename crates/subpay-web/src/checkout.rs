//! Checkout Flow
//!
//! Drives one payment attempt: load the hosted widget, create an order on the
//! backend, open the widget and forward its callback payload for
//! verification. Written against [`CheckoutBackend`] and [`CheckoutGateway`]
//! so the sequence runs the same with the browser implementations or fakes.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::api::{PaymentOrder, Subscription};

pub const SCRIPT_LOAD_ALERT: &str = "Razorpay SDK failed to load. Please check your connection.";
pub const NO_SELECTION_ALERT: &str = "Please select a subscription to proceed.";
pub const SUCCESS_ALERT: &str = "Payment successful!";

/// Checkout failures
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Razorpay SDK failed to load")]
    ScriptLoad,

    #[error("No subscription selected")]
    NoSelection,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Checkout widget error: {0}")]
    Widget(String),

    #[error("Checkout closed before the payment completed")]
    WidgetDismissed,
}

impl CheckoutError {
    /// Alert shown to the user, if this failure gets one.
    ///
    /// Only failures detected before any order exists are surfaced; the rest
    /// go to the console.
    pub fn user_alert(&self) -> Option<&'static str> {
        match self {
            CheckoutError::ScriptLoad => Some(SCRIPT_LOAD_ALERT),
            CheckoutError::NoSelection => Some(NO_SELECTION_ALERT),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        CheckoutError::Network(err.to_string())
    }
}

/// Where the page is in a payment attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckoutStage {
    #[default]
    Idle,
    Selected,
    WidgetOpen,
    Verifying,
    Done,
    Failed,
}

impl CheckoutStage {
    pub fn for_selection(selected: bool) -> Self {
        if selected {
            CheckoutStage::Selected
        } else {
            CheckoutStage::Idle
        }
    }

    /// A payment attempt is underway
    pub fn in_flight(self) -> bool {
        matches!(self, CheckoutStage::WidgetOpen | CheckoutStage::Verifying)
    }

    pub fn status_text(self) -> Option<&'static str> {
        match self {
            CheckoutStage::WidgetOpen => Some("Complete the payment in the Razorpay window..."),
            CheckoutStage::Verifying => Some("Verifying payment..."),
            CheckoutStage::Failed => Some("Payment was not completed."),
            _ => None,
        }
    }
}

/// Backend endpoints used by the page
#[async_trait(?Send)]
pub trait CheckoutBackend {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, CheckoutError>;

    async fn create_order(&self, subscription_id: u64) -> Result<PaymentOrder, CheckoutError>;

    /// Forward the widget's callback payload (JSON text) untouched
    async fn confirm_payment(
        &self,
        response: &str,
        subscription_id: u64,
    ) -> Result<(), CheckoutError>;
}

/// Hosted checkout widget
#[async_trait(?Send)]
pub trait CheckoutGateway {
    /// Make the widget available; `false` if its script could not be loaded
    async fn load(&self) -> bool;

    /// Open the widget and wait for its completion callback, returning the
    /// callback payload as JSON text
    async fn open(&self, options: &CheckoutOptions) -> Result<String, CheckoutError>;
}

/// Placeholder customer details shown pre-filled in the widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl Default for Prefill {
    fn default() -> Self {
        Self {
            name: "User Name".into(),
            email: "user@example.com".into(),
            contact: "1234567890".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub color: String,
}

/// Widget configuration, minus the callbacks
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    /// Amount in paise, as issued with the order
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub theme: Theme,
}

impl CheckoutOptions {
    pub fn new(merchant_key: &str, order: &PaymentOrder, subscription: &Subscription) -> Self {
        Self {
            key: merchant_key.to_string(),
            amount: order.amount,
            currency: "INR".into(),
            name: "Subscription Payment".into(),
            description: subscription.name.clone(),
            order_id: order.id.clone(),
            prefill: Prefill::default(),
            theme: Theme {
                color: "#3399cc".into(),
            },
        }
    }
}

/// Resolve a chosen id against the loaded list
pub fn select(subscriptions: &[Subscription], id: u64) -> Option<Subscription> {
    subscriptions.iter().find(|s| s.id == id).cloned()
}

/// Keep a selection only if it is still in a freshly loaded list
pub fn retain_selection(
    subscriptions: &[Subscription],
    selected: Option<Subscription>,
) -> Option<Subscription> {
    selected.and_then(|s| select(subscriptions, s.id))
}

pub fn pay_disabled(selected: &Option<Subscription>) -> bool {
    selected.is_none()
}

/// Run one payment attempt, reporting stage changes to `on_stage`.
///
/// Returns the subscription that was paid for.
pub async fn run_checkout<B, G>(
    backend: &B,
    gateway: &G,
    merchant_key: &str,
    selected: Option<&Subscription>,
    on_stage: impl Fn(CheckoutStage),
) -> Result<Subscription, CheckoutError>
where
    B: CheckoutBackend + ?Sized,
    G: CheckoutGateway + ?Sized,
{
    if !gateway.load().await {
        return Err(CheckoutError::ScriptLoad);
    }

    let subscription = selected.cloned().ok_or(CheckoutError::NoSelection)?;

    let result = pay(backend, gateway, merchant_key, &subscription, &on_stage).await;
    match &result {
        Ok(()) => on_stage(CheckoutStage::Done),
        Err(_) => on_stage(CheckoutStage::Failed),
    }
    result.map(|()| subscription)
}

async fn pay<B, G>(
    backend: &B,
    gateway: &G,
    merchant_key: &str,
    subscription: &Subscription,
    on_stage: &impl Fn(CheckoutStage),
) -> Result<(), CheckoutError>
where
    B: CheckoutBackend + ?Sized,
    G: CheckoutGateway + ?Sized,
{
    let order = backend.create_order(subscription.id).await?;
    let options = CheckoutOptions::new(merchant_key, &order, subscription);

    on_stage(CheckoutStage::WidgetOpen);
    let response = gateway.open(&options).await?;

    on_stage(CheckoutStage::Verifying);
    backend.confirm_payment(&response, subscription.id).await
}

/// What the page does once an attempt finishes
#[derive(Debug, PartialEq, Eq)]
pub struct Settlement {
    pub alert: Option<&'static str>,
    pub clear_selection: bool,
}

pub fn settle(result: &Result<Subscription, CheckoutError>) -> Settlement {
    match result {
        Ok(_) => Settlement {
            alert: Some(SUCCESS_ALERT),
            clear_selection: true,
        },
        Err(err) => Settlement {
            alert: err.user_alert(),
            clear_selection: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use rust_decimal_macros::dec;
    use std::cell::{Cell, RefCell};

    /// Widget payload with the odd spacing and key order a real one may have
    const CALLBACK: &str = r#"{"razorpay_payment_id":"pay_G3NivgSZLx7I9e","razorpay_order_id":"order_G3NhfSWWh5UfjQ",  "razorpay_signature":"76b2accbefde6cd2392b5fbf098ebcbd4cb4ef8b78d62aa5cce553b2014993c0"}"#;

    #[derive(Default)]
    struct FakeBackend {
        subscriptions: Vec<Subscription>,
        orders_created: RefCell<Vec<u64>>,
        confirmations: RefCell<Vec<(String, u64)>>,
        fail_confirm: bool,
    }

    #[async_trait(?Send)]
    impl CheckoutBackend for FakeBackend {
        async fn list_subscriptions(&self) -> Result<Vec<Subscription>, CheckoutError> {
            Ok(self.subscriptions.clone())
        }

        async fn create_order(&self, subscription_id: u64) -> Result<PaymentOrder, CheckoutError> {
            self.orders_created.borrow_mut().push(subscription_id);
            Ok(PaymentOrder {
                id: "order_G3NhfSWWh5UfjQ".into(),
                amount: 49_900,
            })
        }

        async fn confirm_payment(
            &self,
            response: &str,
            subscription_id: u64,
        ) -> Result<(), CheckoutError> {
            self.confirmations
                .borrow_mut()
                .push((response.to_string(), subscription_id));
            if self.fail_confirm {
                return Err(CheckoutError::Backend {
                    status: 400,
                    message: "Something went wrong".into(),
                });
            }
            Ok(())
        }
    }

    struct FakeWidget {
        loads: bool,
        outcome: Result<String, CheckoutError>,
        opened_with: RefCell<Option<CheckoutOptions>>,
        load_calls: Cell<u32>,
    }

    impl FakeWidget {
        fn paying() -> Self {
            Self {
                loads: true,
                outcome: Ok(CALLBACK.to_string()),
                opened_with: RefCell::new(None),
                load_calls: Cell::new(0),
            }
        }

        fn broken_script() -> Self {
            Self {
                loads: false,
                ..Self::paying()
            }
        }

        fn dismissed() -> Self {
            Self {
                outcome: Err(CheckoutError::WidgetDismissed),
                ..Self::paying()
            }
        }
    }

    #[async_trait(?Send)]
    impl CheckoutGateway for FakeWidget {
        async fn load(&self) -> bool {
            self.load_calls.set(self.load_calls.get() + 1);
            self.loads
        }

        async fn open(&self, options: &CheckoutOptions) -> Result<String, CheckoutError> {
            *self.opened_with.borrow_mut() = Some(options.clone());
            self.outcome.clone()
        }
    }

    fn standard() -> Subscription {
        Subscription {
            id: 2,
            name: "Standard".into(),
            amount: dec!(499.00),
        }
    }

    fn run(
        backend: &FakeBackend,
        widget: &FakeWidget,
        selected: Option<&Subscription>,
    ) -> (Result<Subscription, CheckoutError>, Vec<CheckoutStage>) {
        let stages = RefCell::new(Vec::new());
        let result = block_on(run_checkout(backend, widget, "rzp_test_key", selected, |s| {
            stages.borrow_mut().push(s);
        }));
        (result, stages.into_inner())
    }

    #[test]
    fn test_successful_round_trip() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::paying();
        let sub = standard();

        let (result, stages) = run(&backend, &widget, Some(&sub));

        assert_eq!(result, Ok(sub.clone()));
        assert_eq!(
            stages,
            vec![CheckoutStage::WidgetOpen, CheckoutStage::Verifying, CheckoutStage::Done]
        );
        assert_eq!(*backend.orders_created.borrow(), vec![2]);

        let settlement = settle(&result);
        assert_eq!(settlement.alert, Some(SUCCESS_ALERT));
        assert!(settlement.clear_selection);
    }

    #[test]
    fn test_widget_configuration() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::paying();
        let sub = standard();

        run(&backend, &widget, Some(&sub)).0.unwrap();

        let options = widget.opened_with.borrow().clone().unwrap();
        assert_eq!(options.key, "rzp_test_key");
        assert_eq!(options.amount, 49_900);
        assert_eq!(options.currency, "INR");
        assert_eq!(options.description, "Standard");
        assert_eq!(options.order_id, "order_G3NhfSWWh5UfjQ");

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["prefill"]["email"], "user@example.com");
        assert_eq!(json["theme"]["color"], "#3399cc");
    }

    #[test]
    fn test_confirmation_echoes_widget_payload() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::paying();
        let sub = standard();

        run(&backend, &widget, Some(&sub)).0.unwrap();

        let confirmations = backend.confirmations.borrow();
        assert_eq!(confirmations.len(), 1);
        assert_eq!(confirmations[0].0, CALLBACK);
        assert_eq!(confirmations[0].1, 2);
    }

    #[test]
    fn test_no_selection_alerts_without_backend_calls() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::paying();

        let (result, stages) = run(&backend, &widget, None);

        assert_eq!(result, Err(CheckoutError::NoSelection));
        assert!(stages.is_empty());
        assert!(backend.orders_created.borrow().is_empty());
        assert!(backend.confirmations.borrow().is_empty());
        assert_eq!(settle(&result).alert, Some(NO_SELECTION_ALERT));
        assert!(!settle(&result).clear_selection);
    }

    #[test]
    fn test_script_failure_skips_order_creation() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::broken_script();
        let sub = standard();

        let (result, _) = run(&backend, &widget, Some(&sub));

        assert_eq!(result, Err(CheckoutError::ScriptLoad));
        assert!(backend.orders_created.borrow().is_empty());
        assert!(widget.opened_with.borrow().is_none());
        assert_eq!(settle(&result).alert, Some(SCRIPT_LOAD_ALERT));
    }

    #[test]
    fn test_script_failure_reported_before_missing_selection() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::broken_script();

        let (result, _) = run(&backend, &widget, None);
        assert_eq!(result, Err(CheckoutError::ScriptLoad));
        assert_eq!(widget.load_calls.get(), 1);
    }

    #[test]
    fn test_verification_failure_is_silent() {
        let backend = FakeBackend {
            fail_confirm: true,
            ..FakeBackend::default()
        };
        let widget = FakeWidget::paying();
        let sub = standard();

        let (result, stages) = run(&backend, &widget, Some(&sub));

        assert!(matches!(result, Err(CheckoutError::Backend { status: 400, .. })));
        assert_eq!(stages.last(), Some(&CheckoutStage::Failed));

        let settlement = settle(&result);
        assert_eq!(settlement.alert, None);
        assert!(!settlement.clear_selection);
    }

    #[test]
    fn test_dismissed_widget_skips_confirmation() {
        let backend = FakeBackend::default();
        let widget = FakeWidget::dismissed();
        let sub = standard();

        let (result, stages) = run(&backend, &widget, Some(&sub));

        assert_eq!(result, Err(CheckoutError::WidgetDismissed));
        assert_eq!(stages, vec![CheckoutStage::WidgetOpen, CheckoutStage::Failed]);
        assert!(backend.confirmations.borrow().is_empty());
    }

    #[test]
    fn test_pay_disabled_exactly_without_selection() {
        assert!(pay_disabled(&None));
        assert!(!pay_disabled(&Some(standard())));
    }

    #[test]
    fn test_selection_must_come_from_list() {
        let list = vec![standard()];
        assert_eq!(select(&list, 2), Some(standard()));
        assert_eq!(select(&list, 9), None);

        assert_eq!(retain_selection(&list, Some(standard())), Some(standard()));
        assert_eq!(retain_selection(&[], Some(standard())), None);
    }

    #[test]
    fn test_stage_tracking() {
        assert_eq!(CheckoutStage::for_selection(false), CheckoutStage::Idle);
        assert_eq!(CheckoutStage::for_selection(true), CheckoutStage::Selected);
        assert!(CheckoutStage::Verifying.in_flight());
        assert!(!CheckoutStage::Done.in_flight());
        assert_eq!(CheckoutStage::Selected.status_text(), None);
    }
}
