//! Customer-facing side of the shop: the cart, a cached menu, and the
//! checkout flow that turns a cart into an order over HTTP.

pub mod api_client;
pub mod cart;
pub mod checkout;
pub mod menu;

pub use api_client::{ClientError, StorefrontClient};
pub use cart::{Cart, CartError, CartLineItem, LineKey};
pub use checkout::{
    Checkout, CheckoutError, CustomerDetails, OrderConfirmation, OrderGateway, Session,
    SubmissionState,
};
pub use menu::{MenuProvider, MenuSource, RefreshOutcome};
