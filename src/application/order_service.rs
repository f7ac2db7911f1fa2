use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderDraft, OrderPolicy, OrderView};
use crate::domain::ports::OrderRepository;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

pub struct OrderService<R> {
    repo: R,
    policy: OrderPolicy,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, policy: OrderPolicy) -> Self {
        Self { repo, policy }
    }

    /// Validate the draft, then hand it to the repository which prices and
    /// persists it atomically. Nothing is written when validation fails.
    pub fn create_order(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        draft.validate(&self.policy)?;
        match self.repo.create(draft) {
            Ok(order) => {
                log::info!(
                    "Created order {} with {} line(s), total {}",
                    order.order_number,
                    order.lines.len(),
                    order.total
                );
                Ok(order)
            }
            Err(DomainError::UnknownMenuItem(id)) => {
                log::warn!("Rejected order referencing unknown menu item {}", id);
                Err(DomainError::UnknownMenuItem(id))
            }
            Err(e) => Err(e),
        }
    }

    pub fn get_order(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_by_number(order_number)
    }

    /// `page` is 1-based; out-of-range values are clamped.
    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.repo.list(page.max(1), limit.clamp(1, MAX_PAGE_LIMIT))
    }
}
