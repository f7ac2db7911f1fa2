use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuItem, NewMenuItem};
use crate::domain::order::{
    format_order_number, page_offset, price_lines, CustomerInfo, ListResult, OrderDraft,
    OrderLineView, OrderStatus, OrderView, ORDER_NUMBER_START,
};
use crate::domain::ports::{MenuRepository, OrderRepository};

struct State {
    menu: BTreeMap<i32, MenuItem>,
    next_menu_id: i32,
    orders: Vec<OrderView>,
    next_order_seq: i64,
}

/// Process-local store backing both repository ports.
///
/// A single lock guards the catalog and the orders, so pricing, numbering and
/// inserting an order happen as one unit.
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn empty() -> Self {
        State {
            menu: BTreeMap::new(),
            next_menu_id: 1,
            orders: Vec::new(),
            next_order_seq: ORDER_NUMBER_START,
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::empty()),
        }
    }

    pub fn with_menu(items: Vec<NewMenuItem>) -> Self {
        let mut state = State::empty();
        insert_menu_items(&mut state, items);
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn order_count(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.orders.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))
    }
}

fn insert_menu_items(state: &mut State, items: Vec<NewMenuItem>) -> usize {
    let count = items.len();
    for item in items {
        let id = state.next_menu_id;
        state.next_menu_id += 1;
        state.menu.insert(
            id,
            MenuItem {
                id,
                name: item.name,
                description: item.description,
                category: item.category,
                price: item.price,
                image: item.image,
            },
        );
    }
    count
}

impl MenuRepository for InMemoryStore {
    fn list(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .menu
            .values()
            .filter(|item| category.map_or(true, |c| item.category == c))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: i32) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.lock()?.menu.get(&id).cloned())
    }

    fn count(&self) -> Result<i64, DomainError> {
        Ok(self.lock()?.menu.len() as i64)
    }

    fn insert_many(&self, items: Vec<NewMenuItem>) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        Ok(insert_menu_items(&mut state, items))
    }
}

impl OrderRepository for InMemoryStore {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let mut state = self.lock()?;

        let prices: HashMap<i32, BigDecimal> = draft
            .lines
            .iter()
            .filter_map(|l| state.menu.get(&l.menu_item_id))
            .map(|item| (item.id, item.price.clone()))
            .collect();
        let priced = price_lines(&draft.lines, &prices)?;

        let order_number = format_order_number(state.next_order_seq);
        state.next_order_seq += 1;

        let order = OrderView {
            id: Uuid::new_v4(),
            order_number,
            customer: CustomerInfo {
                name: draft.customer.name.trim().to_string(),
                ..draft.customer
            },
            fulfillment: draft.fulfillment,
            payment_channel: draft.payment_channel,
            status: OrderStatus::Pending,
            total: priced.total,
            created_at: Utc::now(),
            lines: priced
                .lines
                .into_iter()
                .map(|l| OrderLineView {
                    id: Uuid::new_v4(),
                    menu_item_id: l.menu_item_id,
                    quantity: l.quantity,
                    notes: l.notes,
                    unit_price: l.unit_price,
                })
                .collect(),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let total = state.orders.len() as i64;
        let Some(offset) = page_offset(page, limit) else {
            return Ok(ListResult {
                items: vec![],
                total,
            });
        };
        Ok(ListResult {
            items: state
                .orders
                .iter()
                .rev()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(0))
                .map(|o| OrderView {
                    lines: vec![],
                    ..o.clone()
                })
                .collect(),
            total,
        })
    }
}
