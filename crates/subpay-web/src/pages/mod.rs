//! Page Components

mod subscriptions;

pub use subscriptions::SubscriptionPage;
