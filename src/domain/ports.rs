use std::sync::Arc;

use super::errors::DomainError;
use super::menu::{MenuItem, NewMenuItem};
use super::order::{ListResult, OrderDraft, OrderView};

pub trait MenuRepository: Send + Sync + 'static {
    fn list(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError>;
    fn find_by_id(&self, id: i32) -> Result<Option<MenuItem>, DomainError>;
    fn count(&self) -> Result<i64, DomainError>;
    fn insert_many(&self, items: Vec<NewMenuItem>) -> Result<usize, DomainError>;
}

/// Order persistence. `create` prices the draft against the current catalog,
/// assigns an order number and stores the order with its lines as one unit.
pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

impl<T: MenuRepository + ?Sized> MenuRepository for Arc<T> {
    fn list(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        (**self).list(category)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<MenuItem>, DomainError> {
        (**self).find_by_id(id)
    }

    fn count(&self) -> Result<i64, DomainError> {
        (**self).count()
    }

    fn insert_many(&self, items: Vec<NewMenuItem>) -> Result<usize, DomainError> {
        (**self).insert_many(items)
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        (**self).create(draft)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        (**self).find_by_number(order_number)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        (**self).list(page, limit)
    }
}
