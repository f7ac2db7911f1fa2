use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::{DomainError, FieldError};

/// First value handed out by the order number sequence.
pub const ORDER_NUMBER_START: i64 = 1000;

/// Column widths of the `orders` table, in characters.
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 64;

/// Largest quantity accepted on a single order line.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Order totals must stay below this to fit `NUMERIC(12, 2)`.
pub const ORDER_TOTAL_LIMIT: i64 = 10_000_000_000;

pub fn format_order_number(seq: i64) -> String {
    format!("ORD-{:06}", seq)
}

// ── Value types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMode {
    Table,
    Pickup,
    Delivery,
}

impl FulfillmentMode {
    pub const ALL: [FulfillmentMode; 3] = [
        FulfillmentMode::Table,
        FulfillmentMode::Pickup,
        FulfillmentMode::Delivery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FulfillmentMode::Table => "table",
            FulfillmentMode::Pickup => "pickup",
            FulfillmentMode::Delivery => "delivery",
        }
    }
}

impl fmt::Display for FulfillmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(FulfillmentMode::Table),
            "pickup" => Ok(FulfillmentMode::Pickup),
            "delivery" => Ok(FulfillmentMode::Delivery),
            other => Err(format!("unknown fulfillment mode '{}'", other)),
        }
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fulfillment {
    Table { table_number: i32 },
    Pickup,
    Delivery { address: String },
}

impl Fulfillment {
    pub fn mode(&self) -> FulfillmentMode {
        match self {
            Fulfillment::Table { .. } => FulfillmentMode::Table,
            Fulfillment::Pickup => FulfillmentMode::Pickup,
            Fulfillment::Delivery { .. } => FulfillmentMode::Delivery,
        }
    }

    pub fn table_number(&self) -> Option<i32> {
        match self {
            Fulfillment::Table { table_number } => Some(*table_number),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Fulfillment::Delivery { address } => Some(address),
            _ => None,
        }
    }

    /// Rebuild a fulfillment from its flattened storage columns.
    pub fn from_parts(
        mode: &str,
        table_number: Option<i32>,
        address: Option<String>,
    ) -> Result<Self, DomainError> {
        let mode = FulfillmentMode::from_str(mode).map_err(DomainError::Internal)?;
        match mode {
            FulfillmentMode::Table => table_number
                .map(|table_number| Fulfillment::Table { table_number })
                .ok_or_else(|| DomainError::Internal("table order without table number".into())),
            FulfillmentMode::Pickup => Ok(Fulfillment::Pickup),
            FulfillmentMode::Delivery => address
                .map(|address| Fulfillment::Delivery { address })
                .ok_or_else(|| DomainError::Internal("delivery order without address".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    #[default]
    Cash,
    Qris,
    Debit,
    Card,
}

impl PaymentChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentChannel::Cash => "cash",
            PaymentChannel::Qris => "qris",
            PaymentChannel::Debit => "debit",
            PaymentChannel::Card => "card",
        }
    }
}

impl FromStr for PaymentChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentChannel::Cash),
            "qris" => Ok(PaymentChannel::Qris),
            "debit" => Ok(PaymentChannel::Debit),
            "card" => Ok(PaymentChannel::Card),
            other => Err(format!("unknown payment channel '{}'", other)),
        }
    }
}

/// Order lifecycle. Orders are created `Pending`; later transitions belong to
/// the fulfillment side and are only read here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

// ── Ordering policy (deployment configuration) ───────────────────────────────

/// Which contact field a customer must provide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContactRequirement {
    #[default]
    Email,
    Phone,
    Either,
}

impl FromStr for ContactRequirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(ContactRequirement::Email),
            "phone" => Ok(ContactRequirement::Phone),
            "either" => Ok(ContactRequirement::Either),
            other => Err(format!("unknown contact requirement '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPolicy {
    pub contact: ContactRequirement,
    pub fulfillment_modes: Vec<FulfillmentMode>,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            contact: ContactRequirement::default(),
            fulfillment_modes: FulfillmentMode::ALL.to_vec(),
        }
    }
}

// ── Order creation input ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineInput {
    pub menu_item_id: i32,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// A customer's order request before it has been priced or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer: CustomerInfo,
    pub fulfillment: Fulfillment,
    pub payment_channel: PaymentChannel,
    pub lines: Vec<OrderLineInput>,
}

impl OrderDraft {
    /// Check required-ness and shape of every field, collecting all problems
    /// rather than stopping at the first.
    pub fn validate(&self, policy: &OrderPolicy) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        let name = self.customer.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("customer_name", "is required"));
        }
        check_length(&mut errors, "customer_name", name, MAX_NAME_LEN);

        let email = present(&self.customer.email);
        let phone = present(&self.customer.phone);
        if let Some(raw) = self.customer.email.as_deref() {
            check_length(&mut errors, "customer_email", raw, MAX_EMAIL_LEN);
        }
        if let Some(raw) = self.customer.phone.as_deref() {
            check_length(&mut errors, "customer_phone", raw, MAX_PHONE_LEN);
        }
        if let Some(email) = email {
            if !looks_like_email(email) {
                errors.push(FieldError::new("customer_email", "is not a valid email address"));
            }
        }
        match policy.contact {
            ContactRequirement::Email if email.is_none() => {
                errors.push(FieldError::new("customer_email", "is required"));
            }
            ContactRequirement::Phone if phone.is_none() => {
                errors.push(FieldError::new("customer_phone", "is required"));
            }
            ContactRequirement::Either if email.is_none() && phone.is_none() => {
                errors.push(FieldError::new(
                    "customer_phone",
                    "an email address or phone number is required",
                ));
            }
            _ => {}
        }

        let mode = self.fulfillment.mode();
        if !policy.fulfillment_modes.contains(&mode) {
            errors.push(FieldError::new(
                "fulfillment.type",
                format!("{} orders are not accepted", mode),
            ));
        }
        match &self.fulfillment {
            Fulfillment::Table { table_number } if *table_number < 1 => {
                errors.push(FieldError::new("fulfillment.table_number", "must be at least 1"));
            }
            Fulfillment::Delivery { address } if address.trim().is_empty() => {
                errors.push(FieldError::new("fulfillment.address", "is required"));
            }
            _ => {}
        }

        if self.lines.is_empty() {
            errors.push(FieldError::new("items", "must contain at least one item"));
        }
        for (i, line) in self.lines.iter().enumerate() {
            if line.quantity < 1 {
                errors.push(FieldError::new(
                    format!("items[{}].quantity", i),
                    "must be at least 1",
                ));
            } else if line.quantity > MAX_LINE_QUANTITY {
                errors.push(FieldError::new(
                    format!("items[{}].quantity", i),
                    format!("must be at most {}", MAX_LINE_QUANTITY),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

fn check_length(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !value.contains(' ')
        }
        None => false,
    }
}

// ── Pricing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub menu_item_id: i32,
    pub quantity: i32,
    pub notes: Option<String>,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: BigDecimal,
}

/// Price every line from the current catalog prices.
///
/// `prices` maps menu item ids to their current price. Any id missing from it
/// fails the whole order.
pub fn price_lines(
    lines: &[OrderLineInput],
    prices: &HashMap<i32, BigDecimal>,
) -> Result<PricedOrder, DomainError> {
    let mut total = BigDecimal::zero();
    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        let unit_price = prices
            .get(&line.menu_item_id)
            .ok_or(DomainError::UnknownMenuItem(line.menu_item_id))?;
        total += unit_price * BigDecimal::from(line.quantity);
        priced.push(PricedLine {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            notes: line.notes.clone().filter(|n| !n.is_empty()),
            unit_price: unit_price.clone(),
        });
    }
    if total >= BigDecimal::from(ORDER_TOTAL_LIMIT) {
        return Err(DomainError::Validation(vec![FieldError::new(
            "items",
            "order total is too large",
        )]));
    }
    Ok(PricedOrder {
        lines: priced,
        total,
    })
}

// ── Read models ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub notes: Option<String>,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub customer: CustomerInfo,
    pub fulfillment: Fulfillment,
    pub payment_channel: PaymentChannel,
    pub status: OrderStatus,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Rows to skip for a 1-based `page`. `None` when the offset does not fit in
/// an `i64`, which means the page is past every stored order.
pub fn page_offset(page: i64, limit: i64) -> Option<i64> {
    page.checked_sub(1)?
        .checked_mul(limit)
        .filter(|offset| *offset >= 0)
}
