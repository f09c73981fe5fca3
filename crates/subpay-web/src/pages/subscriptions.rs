//! Subscription Checkout Page

use leptos::logging;
use leptos::prelude::*;

use crate::api::{HttpBackend, Subscription};
use crate::browser;
use crate::checkout::{self, CheckoutBackend, CheckoutStage};
use crate::components::SubscriptionOption;
use crate::config;
use crate::razorpay::RazorpayWidget;

#[component]
pub fn SubscriptionPage() -> impl IntoView {
    let (subscriptions, set_subscriptions) = signal(Vec::<Subscription>::new());
    let (selected, set_selected) = signal(None::<Subscription>);
    let (stage, set_stage) = signal(CheckoutStage::Idle);

    // Load the list once, when the page is created
    leptos::task::spawn_local(async move {
        match HttpBackend::from_config().list_subscriptions().await {
            Ok(list) => {
                set_selected.update(|s| *s = checkout::retain_selection(&list, s.take()));
                set_subscriptions.set(list);
            }
            Err(e) => logging::error!("Error fetching subscriptions: {}", e),
        }
    });

    Effect::new(move |_| {
        let next = CheckoutStage::for_selection(selected.with(Option::is_some));
        set_stage.update(|s| {
            if !s.in_flight() {
                *s = next;
            }
        });
    });

    let pay = move |_| {
        let selection = selected.get_untracked();
        leptos::task::spawn_local(async move {
            let backend = HttpBackend::from_config();
            let result = checkout::run_checkout(
                &backend,
                &RazorpayWidget,
                config::merchant_key(),
                selection.as_ref(),
                |s| set_stage.set(s),
            )
            .await;

            if let Err(e) = &result {
                logging::error!("Checkout failed: {}", e);
            }

            let settlement = checkout::settle(&result);
            if let Some(message) = settlement.alert {
                browser::alert(message);
            }
            if settlement.clear_selection {
                set_selected.set(None);
            }
        });
    };

    view! {
        <div class="container" style="margin-top: 20vh">
            <h1>"Subscription Payment"</h1>
            <div>
                <h3>"Select a subscription to pay for:"</h3>
                <Show
                    when=move || subscriptions.with(|list| !list.is_empty())
                    fallback=|| view! { <p>"Loading subscriptions..."</p> }
                >
                    <ul>
                        <For
                            each=move || subscriptions.get()
                            key=|subscription| subscription.id
                            children=move |subscription| {
                                view! {
                                    <SubscriptionOption
                                        subscription=subscription
                                        subscriptions=subscriptions
                                        selected=selected
                                        set_selected=set_selected
                                    />
                                }
                            }
                        />
                    </ul>
                </Show>
            </div>
            <button
                on:click=pay
                class="btn btn-primary"
                disabled=move || selected.with(checkout::pay_disabled)
            >
                "Pay with Razorpay"
            </button>
            <p class="status">{move || stage.get().status_text()}</p>
        </div>
    }
}
