//! Order Records
//!
//! Tracks each Razorpay order created for a subscription and whether it has
//! been paid.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::catalog::Subscription;
use crate::error::{PaymentError, Result};

/// Display format for `order_date`, e.g. `05 March 2025 04:30 PM`
pub const ORDER_DATE_FORMAT: &str = "%d %B %Y %I:%M %p";

/// A locally stored order
#[derive(Clone, Debug, Serialize)]
pub struct Order {
    pub id: u64,

    /// Subscription being purchased
    pub subscription: Subscription,

    /// Razorpay order ID (`order_...`)
    pub order_payment_id: String,

    #[serde(rename = "isPaid")]
    pub is_paid: bool,

    /// Last modification time
    #[serde(serialize_with = "serialize_order_date")]
    pub order_date: DateTime<Utc>,
}

fn serialize_order_date<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(ORDER_DATE_FORMAT))
}

impl Order {
    /// Mark the order paid and bump its timestamp
    pub fn mark_paid(&mut self) {
        self.is_paid = true;
        self.order_date = Utc::now();
    }
}

/// Order storage trait
pub trait OrderStore: Send + Sync {
    /// Record a new unpaid order for a Razorpay order id
    fn create(&self, subscription: Subscription, order_payment_id: &str) -> Result<Order>;

    /// Get order by Razorpay order id
    fn get_by_payment_id(&self, order_payment_id: &str) -> Result<Option<Order>>;

    /// Mark an order paid, returning the updated record
    fn mark_paid(&self, order_payment_id: &str) -> Result<Order>;
}

/// In-memory order store (for development)
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
    next_id: RwLock<u64>,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            next_id: RwLock::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderStore for MemoryOrderStore {
    fn create(&self, subscription: Subscription, order_payment_id: &str) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        let mut next_id = self
            .next_id
            .write()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        let order = Order {
            id: *next_id,
            subscription,
            order_payment_id: order_payment_id.to_string(),
            is_paid: false,
            order_date: Utc::now(),
        };
        *next_id += 1;

        orders.insert(order.order_payment_id.clone(), order.clone());

        tracing::debug!(
            order_id = order.id,
            razorpay_order_id = %order.order_payment_id,
            subscription_id = order.subscription.id,
            "Stored order"
        );

        Ok(order)
    }

    fn get_by_payment_id(&self, order_payment_id: &str) -> Result<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        Ok(orders.get(order_payment_id).cloned())
    }

    fn mark_paid(&self, order_payment_id: &str) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        let order = orders
            .get_mut(order_payment_id)
            .ok_or_else(|| PaymentError::OrderNotFound(order_payment_id.to_string()))?;
        order.mark_paid();

        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn basic() -> Subscription {
        Subscription::new(1, "Basic", dec!(199))
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let store = MemoryOrderStore::new();
        let first = store.create(basic(), "order_A").unwrap();
        let second = store.create(basic(), "order_B").unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.is_paid);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_mark_paid() {
        let store = MemoryOrderStore::new();
        store.create(basic(), "order_A").unwrap();

        let paid = store.mark_paid("order_A").unwrap();
        assert!(paid.is_paid);
        assert!(store.get_by_payment_id("order_A").unwrap().unwrap().is_paid);
    }

    #[test]
    fn test_mark_paid_unknown_order() {
        let store = MemoryOrderStore::new();
        assert!(matches!(
            store.mark_paid("order_missing"),
            Err(PaymentError::OrderNotFound(id)) if id == "order_missing"
        ));
    }

    #[test]
    fn test_order_serialization() {
        let order = Order {
            id: 4,
            subscription: basic(),
            order_payment_id: "order_A".into(),
            is_paid: false,
            order_date: Utc.with_ymd_and_hms(2025, 3, 5, 16, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["isPaid"], false);
        assert_eq!(json["order_date"], "05 March 2025 04:30 PM");
        assert_eq!(json["subscription"]["name"], "Basic");
    }
}
