//! UI Components

use leptos::prelude::*;

use crate::api::Subscription;
use crate::checkout;

/// One radio choice in the subscription list
#[component]
pub fn SubscriptionOption(
    subscription: Subscription,
    subscriptions: ReadSignal<Vec<Subscription>>,
    selected: ReadSignal<Option<Subscription>>,
    set_selected: WriteSignal<Option<Subscription>>,
) -> impl IntoView {
    let id = subscription.id;
    let input_id = format!("subscription-{id}");
    let label = subscription.label();

    view! {
        <li>
            <input
                type="radio"
                id=input_id.clone()
                name="subscription"
                value=id.to_string()
                prop:checked=move || selected.with(|s| s.as_ref().map(|s| s.id) == Some(id))
                on:change=move |_| {
                    let choice = subscriptions.with_untracked(|list| checkout::select(list, id));
                    set_selected.set(choice);
                }
            />
            <label for=input_id>{label}</label>
        </li>
    }
}
