//! Subscription Catalog
//!
//! Plans offered for purchase, and the store that serves them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use crate::error::{PaymentError, Result};

/// Currency every plan is priced in
pub const CURRENCY: &str = "INR";

/// A purchasable subscription plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,

    /// Display name
    pub name: String,

    /// Price in rupees
    pub price: Decimal,

    #[serde(default)]
    pub description: String,

    /// Billing period length
    #[serde(default = "default_duration")]
    pub duration_in_months: u32,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_duration() -> u32 {
    1
}

impl Subscription {
    pub fn new(id: u64, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: String::new(),
            duration_in_months: default_duration(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_duration(mut self, months: u32) -> Self {
        self.duration_in_months = months;
        self
    }

    /// Price in the smallest currency unit (paise), as Razorpay expects
    pub fn amount_in_paise(&self) -> Result<u64> {
        let paise = (self.price * Decimal::ONE_HUNDRED).round();
        paise.to_u64().ok_or_else(|| {
            PaymentError::InvalidPayload(format!(
                "price {} of subscription {} is not a payable amount",
                self.price, self.id
            ))
        })
    }
}

/// Subscription storage trait
pub trait SubscriptionStore: Send + Sync {
    /// All subscriptions, ordered by id
    fn list(&self) -> Result<Vec<Subscription>>;

    /// Get subscription by id
    fn get(&self, id: u64) -> Result<Option<Subscription>>;

    /// Save or replace a subscription
    fn insert(&self, subscription: Subscription) -> Result<()>;
}

/// In-memory subscription store
pub struct MemorySubscriptionStore {
    subscriptions: RwLock<BTreeMap<u64, Subscription>>,
}

impl Default for MemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_subscriptions(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let map = subscriptions.into_iter().map(|s| (s.id, s)).collect();
        Self {
            subscriptions: RwLock::new(map),
        }
    }

    /// Demo catalog used when no seed file is configured
    pub fn demo() -> Self {
        Self::with_subscriptions([
            Subscription::new(1, "Basic", dec!(199.00))
                .with_description("Single device, standard support"),
            Subscription::new(2, "Standard", dec!(499.00))
                .with_description("Three devices, priority support")
                .with_duration(3),
            Subscription::new(3, "Premium", dec!(1499.00))
                .with_description("Unlimited devices, dedicated support")
                .with_duration(12),
        ])
    }

    /// Load a JSON array of subscriptions
    pub fn from_json(json: &str) -> Result<Self> {
        let subscriptions: Vec<Subscription> = serde_json::from_str(json)
            .map_err(|e| PaymentError::Config(format!("invalid subscription catalog: {e}")))?;
        Ok(Self::with_subscriptions(subscriptions))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PaymentError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Seed from `SUBSCRIPTIONS_FILE` if set, else the demo catalog
    pub fn from_env() -> Result<Self> {
        match std::env::var("SUBSCRIPTIONS_FILE") {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::demo()),
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn list(&self) -> Result<Vec<Subscription>> {
        let subscriptions = self
            .subscriptions
            .read()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        Ok(subscriptions.values().cloned().collect())
    }

    fn get(&self, id: u64) -> Result<Option<Subscription>> {
        let subscriptions = self
            .subscriptions
            .read()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        Ok(subscriptions.get(&id).cloned())
    }

    fn insert(&self, subscription: Subscription) -> Result<()> {
        let mut subscriptions = self
            .subscriptions
            .write()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        subscriptions.insert(subscription.id, subscription);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_in_paise() {
        let sub = Subscription::new(1, "Basic", dec!(199.99));
        assert_eq!(sub.amount_in_paise().unwrap(), 19999);

        let sub = Subscription::new(2, "Free", Decimal::ZERO);
        assert_eq!(sub.amount_in_paise().unwrap(), 0);
    }

    #[test]
    fn test_negative_price_rejected() {
        let sub = Subscription::new(1, "Broken", dec!(-5));
        assert!(matches!(
            sub.amount_in_paise(),
            Err(PaymentError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let store = MemorySubscriptionStore::with_subscriptions([
            Subscription::new(3, "C", dec!(3)),
            Subscription::new(1, "A", dec!(1)),
            Subscription::new(2, "B", dec!(2)),
        ]);
        let ids: Vec<u64> = store.list().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_json_accepts_string_and_number_prices() {
        let store = MemorySubscriptionStore::from_json(
            r#"[
                {"id": 1, "name": "Monthly", "price": "299.00"},
                {"id": 2, "name": "Yearly", "price": 2999, "duration_in_months": 12}
            ]"#,
        )
        .unwrap();

        let monthly = store.get(1).unwrap().unwrap();
        assert_eq!(monthly.price, dec!(299.00));
        assert_eq!(monthly.duration_in_months, 1);

        let yearly = store.get(2).unwrap().unwrap();
        assert_eq!(yearly.amount_in_paise().unwrap(), 299_900);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            MemorySubscriptionStore::from_json("{not json"),
            Err(PaymentError::Config(_))
        ));
    }

    #[test]
    fn test_demo_catalog() {
        let store = MemorySubscriptionStore::demo();
        assert_eq!(store.len(), 3);
        assert!(store.get(99).unwrap().is_none());
    }
}
