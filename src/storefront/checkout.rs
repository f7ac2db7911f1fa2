use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::errors::FieldError;
use crate::domain::order::{CustomerInfo, Fulfillment, PaymentChannel};
use crate::handlers::orders::{CreateOrderRequest, CreateOrderResponse, OrderItemRequest};

use super::api_client::ClientError;
use super::cart::{Cart, LineKey};

/// Where checkout sends finished orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ClientError>;
}

#[async_trait]
impl<T: OrderGateway + ?Sized> OrderGateway for Arc<T> {
    async fn submit_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ClientError> {
        (**self).submit_order(request).await
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("An order is already being submitted")]
    AlreadyPending,

    #[error("{message}")]
    Rejected {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Order could not be placed: {0}")]
    Unavailable(String),
}

impl From<ClientError> for CheckoutError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Status {
                status,
                message,
                fields,
            } if (400..500).contains(&status) => CheckoutError::Rejected { message, fields },
            other => CheckoutError::Unavailable(other.to_string()),
        }
    }
}

/// What the customer sees after a successful order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_number: String,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded(OrderConfirmation),
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }
}

/// Checkout form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub customer: CustomerInfo,
    pub fulfillment: Fulfillment,
    pub payment_channel: PaymentChannel,
}

/// One customer's cart and checkout progress.
///
/// Lock order is submission before cart. Neither lock is held across an
/// `.await`.
#[derive(Debug, Default)]
pub struct Session {
    cart: Mutex<Cart>,
    submission: Mutex<SubmissionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the cart.
    pub fn with_cart<T>(&self, f: impl FnOnce(&mut Cart) -> T) -> T {
        f(&mut self.lock_cart())
    }

    pub fn cart(&self) -> Cart {
        self.lock_cart().clone()
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.lock_submission().clone()
    }

    fn lock_cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_submission(&self) -> MutexGuard<'_, SubmissionState> {
        self.submission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Puts a session back to `Idle` if the submit future is dropped before it
/// settles.
struct PendingSubmission<'a> {
    session: &'a Session,
    settled: bool,
}

impl PendingSubmission<'_> {
    fn settle(mut self, state: SubmissionState) {
        *self.session.lock_submission() = state;
        self.settled = true;
    }
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::debug!("Order submission abandoned; cart left as is");
            *self.session.lock_submission() = SubmissionState::Idle;
        }
    }
}

pub struct Checkout<G> {
    gateway: G,
}

impl<G: OrderGateway> Checkout<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn state(&self, session: &Session) -> SubmissionState {
        session.submission_state()
    }

    /// Send the session's cart as one order.
    ///
    /// Once the shop confirms the order, the submitted lines leave the cart;
    /// anything added while the request was in flight stays. Any failure
    /// leaves the cart as it was so the customer can retry.
    pub async fn submit(
        &self,
        session: &Session,
        customer: CustomerDetails,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let (request, submitted) = {
            let mut submission = session.lock_submission();
            if submission.is_pending() {
                return Err(CheckoutError::AlreadyPending);
            }
            let cart = session.lock_cart();
            if cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            let request = build_request(&cart, customer);
            let submitted: Vec<(LineKey, i32)> =
                cart.lines().map(|l| (l.key(), l.quantity)).collect();
            *submission = SubmissionState::Pending;
            (request, submitted)
        };
        let pending = PendingSubmission {
            session,
            settled: false,
        };

        let result = self
            .gateway
            .submit_order(&request)
            .await
            .map_err(CheckoutError::from)
            .and_then(confirmation);

        match result {
            Ok(confirmation) => {
                session.with_cart(|cart| {
                    for (key, quantity) in &submitted {
                        cart.deduct(key, *quantity);
                    }
                });
                log::info!(
                    "Order {} placed, total {}",
                    confirmation.order_number,
                    confirmation.total
                );
                pending.settle(SubmissionState::Succeeded(confirmation.clone()));
                Ok(confirmation)
            }
            Err(e) => {
                log::warn!("Order submission failed: {}", e);
                pending.settle(SubmissionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}

fn build_request(cart: &Cart, details: CustomerDetails) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: details.customer.name,
        customer_email: details.customer.email,
        customer_phone: details.customer.phone,
        fulfillment: details.fulfillment,
        payment_channel: details.payment_channel,
        items: cart
            .lines()
            .map(|line| OrderItemRequest {
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                notes: (!line.notes.is_empty()).then(|| line.notes.clone()),
            })
            .collect(),
    }
}

fn confirmation(resp: CreateOrderResponse) -> Result<OrderConfirmation, CheckoutError> {
    if resp.order_number.trim().is_empty() {
        return Err(CheckoutError::Unavailable(
            "response carried no order number".to_string(),
        ));
    }
    let total = BigDecimal::from_str(&resp.total).map_err(|e| {
        CheckoutError::Unavailable(format!("response total {:?}: {}", resp.total, e))
    })?;
    Ok(OrderConfirmation {
        order_number: resp.order_number,
        total,
    })
}
