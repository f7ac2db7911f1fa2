use std::sync::Arc;

use crate::application::menu_service::MenuService;
use crate::application::order_service::OrderService;
use crate::currency::Currency;
use crate::domain::order::OrderPolicy;
use crate::domain::ports::{MenuRepository, OrderRepository};

/// Shared by every actix worker through `web::Data`.
pub struct AppState {
    pub menu: MenuService<Arc<dyn MenuRepository>>,
    pub orders: OrderService<Arc<dyn OrderRepository>>,
    pub currency: Currency,
}

impl AppState {
    pub fn new(
        menu_repo: Arc<dyn MenuRepository>,
        order_repo: Arc<dyn OrderRepository>,
        policy: OrderPolicy,
        currency: Currency,
    ) -> Self {
        Self {
            menu: MenuService::new(menu_repo),
            orders: OrderService::new(order_repo, policy),
            currency,
        }
    }
}
