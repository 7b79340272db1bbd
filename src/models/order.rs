use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{nullable, require_non_negative, ModelError, Validate};
use crate::repository::Entity;

/// Order lifecycle.
///
/// Main line: draft -> pending -> confirmed -> processing -> shipped -> delivered -> completed.
/// `cancelled` and `refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Draft,
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Position on the main line; `None` for the terminal side states
    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Draft => Some(0),
            OrderStatus::Pending => Some(1),
            OrderStatus::Confirmed => Some(2),
            OrderStatus::Processing => Some(3),
            OrderStatus::Shipped => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Completed => Some(6),
            OrderStatus::Cancelled | OrderStatus::Refunded => None,
        }
    }

    /// Still being worked on (counted as pending in reports)
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Draft | OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    /// Goods have reached the customer (counted as completed in reports)
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    /// Forward moves along the main line may skip steps. Cancellation is only
    /// possible before shipping; refunds only after delivery. Re-applying the
    /// current status is always allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        match next {
            OrderStatus::Cancelled => self.is_open(),
            OrderStatus::Refunded => self.is_fulfilled(),
            _ => match (self.rank(), next.rank()) {
                (Some(from), Some(to)) => to > from,
                _ => false,
            },
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Purchase,
    Sales,
    Transfer,
    Adjustment,
    Return,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Purchase => "purchase",
            OrderType::Sales => "sales",
            OrderType::Transfer => "transfer",
            OrderType::Adjustment => "adjustment",
            OrderType::Return => "return",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "purchase" => Some(OrderType::Purchase),
            "sales" => Some(OrderType::Sales),
            "transfer" => Some(OrderType::Transfer),
            "adjustment" => Some(OrderType::Adjustment),
            "return" => Some(OrderType::Return),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Partial,
    Overdue,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "partial" => Some(PaymentStatus::Partial),
            "overdue" => Some(PaymentStatus::Overdue),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl OrderPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPriority::Low => "low",
            OrderPriority::Normal => "normal",
            OrderPriority::High => "high",
            OrderPriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(OrderPriority::Low),
            "normal" => Some(OrderPriority::Normal),
            "high" => Some(OrderPriority::High),
            "urgent" => Some(OrderPriority::Urgent),
            _ => None,
        }
    }
}

/// `subtotal + tax + shipping - discount`
pub fn order_total(subtotal: f64, tax_amount: f64, shipping_cost: f64, discount_amount: f64) -> f64 {
    subtotal + tax_amount + shipping_cost - discount_amount
}

/// `ORD-YYYYMMDD-XXXXXX` with a random uppercase alphanumeric suffix
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub payment_status: PaymentStatus,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub shipping_cost: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub order_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub priority: OrderPriority,
    pub is_rush_order: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn outstanding_amount(&self) -> f64 {
        (self.total_amount - self.paid_amount).max(0.0)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now) && self.outstanding_amount() > 0.0
    }

    fn recompute_total(&mut self) -> Result<(), ModelError> {
        let total = order_total(self.subtotal, self.tax_amount, self.shipping_cost, self.discount_amount);
        if total < 0.0 {
            return Err(ModelError::Validation(
                "Discount cannot exceed subtotal plus tax and shipping".to_string(),
            ));
        }
        self.total_amount = total;
        Ok(())
    }

    /// Move to `next`, stamping shipped/delivered dates the first time they are reached
    pub fn transition_to(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<(), ModelError> {
        if !self.status.can_transition_to(next) {
            return Err(ModelError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        match next {
            OrderStatus::Shipped => {
                self.shipped_date.get_or_insert(now);
            }
            OrderStatus::Delivered | OrderStatus::Completed => {
                self.shipped_date.get_or_insert(now);
                self.delivered_date.get_or_insert(now);
            }
            OrderStatus::Refunded => self.payment_status = PaymentStatus::Refunded,
            _ => {}
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub warehouse_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: OrderPriority,
    #[serde(default)]
    pub is_rush_order: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for OrderCreate {
    fn validate(&self) -> Result<(), ModelError> {
        if let Some(number) = &self.order_number {
            super::require_non_empty("Order number", number)?;
        }
        require_non_negative("Subtotal", self.subtotal)?;
        require_non_negative("Tax amount", self.tax_amount)?;
        require_non_negative("Shipping cost", self.shipping_cost)?;
        require_non_negative("Discount amount", self.discount_amount)?;
        require_non_negative("Paid amount", self.paid_amount)?;
        if order_total(self.subtotal, self.tax_amount, self.shipping_cost, self.discount_amount) < 0.0 {
            return Err(ModelError::Validation(
                "Discount cannot exceed subtotal plus tax and shipping".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<OrderPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rush_order: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl OrderUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Validate for OrderUpdate {
    fn validate(&self) -> Result<(), ModelError> {
        for (field, value) in [
            ("Subtotal", self.subtotal),
            ("Tax amount", self.tax_amount),
            ("Shipping cost", self.shipping_cost),
            ("Discount amount", self.discount_amount),
            ("Paid amount", self.paid_amount),
        ] {
            if let Some(v) = value {
                require_non_negative(field, v)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl Entity for Order {
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Filter = OrderFilter;

    const NAME: &'static str = "Order";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(input: OrderCreate, now: DateTime<Utc>) -> Result<Self, ModelError> {
        let order_number = match input.order_number {
            Some(number) => number.trim().to_string(),
            None => generate_order_number(now),
        };
        let mut order = Order {
            id: Uuid::new_v4(),
            order_number,
            status: input.status.unwrap_or_default(),
            order_type: input.order_type,
            payment_status: input.payment_status,
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            user_id: input.user_id,
            subtotal: input.subtotal,
            tax_amount: input.tax_amount,
            shipping_cost: input.shipping_cost,
            discount_amount: input.discount_amount,
            total_amount: 0.0,
            paid_amount: input.paid_amount,
            order_date: input.order_date.unwrap_or(now),
            due_date: input.due_date,
            shipped_date: None,
            delivered_date: None,
            priority: input.priority,
            is_rush_order: input.is_rush_order,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        order.recompute_total()?;
        Ok(order)
    }

    fn apply(&mut self, update: OrderUpdate, now: DateTime<Utc>) -> Result<(), ModelError> {
        let mut next = self.clone();
        if let Some(order_type) = update.order_type {
            next.order_type = order_type;
        }
        if let Some(payment_status) = update.payment_status {
            next.payment_status = payment_status;
        }
        if let Some(supplier_id) = update.supplier_id {
            next.supplier_id = supplier_id;
        }
        if let Some(warehouse_id) = update.warehouse_id {
            next.warehouse_id = warehouse_id;
        }
        if let Some(subtotal) = update.subtotal {
            next.subtotal = subtotal;
        }
        if let Some(tax) = update.tax_amount {
            next.tax_amount = tax;
        }
        if let Some(shipping) = update.shipping_cost {
            next.shipping_cost = shipping;
        }
        if let Some(discount) = update.discount_amount {
            next.discount_amount = discount;
        }
        if let Some(paid) = update.paid_amount {
            next.paid_amount = paid;
        }
        if let Some(order_date) = update.order_date {
            next.order_date = order_date;
        }
        if let Some(due_date) = update.due_date {
            next.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            next.priority = priority;
        }
        if let Some(rush) = update.is_rush_order {
            next.is_rush_order = rush;
        }
        if let Some(notes) = update.notes {
            next.notes = notes;
        }
        next.recompute_total()?;
        if let Some(status) = update.status {
            next.transition_to(status, now)?;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.status.map_or(true, |s| self.status == s)
            && filter.supplier_id.map_or(true, |id| self.supplier_id == Some(id))
            && filter.warehouse_id.map_or(true, |id| self.warehouse_id == Some(id))
            && filter.user_id.map_or(true, |id| self.user_id == Some(id))
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.order_number.to_ascii_uppercase())
    }
}

#[cfg(test)]
pub(crate) fn sample_order(total: f64, order_date: DateTime<Utc>, status: OrderStatus) -> Order {
    let input = OrderCreate {
        status: Some(status),
        subtotal: total,
        order_date: Some(order_date),
        ..Default::default()
    };
    Order::create(input, order_date).expect("valid sample order")
}
