use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    format_order_number, page_offset, price_lines, CustomerInfo, Fulfillment, ListResult,
    OrderDraft, OrderLineView, OrderStatus, OrderView, PaymentChannel,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{menu_items, order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn order_view(order: OrderRow, lines: Vec<OrderItemRow>) -> Result<OrderView, DomainError> {
    Ok(OrderView {
        id: order.id,
        fulfillment: Fulfillment::from_parts(
            &order.fulfillment_type,
            order.table_number,
            order.delivery_address,
        )?,
        payment_channel: PaymentChannel::from_str(&order.payment_channel)
            .map_err(DomainError::Internal)?,
        status: OrderStatus::from_str(&order.status).map_err(DomainError::Internal)?,
        order_number: order.order_number,
        customer: CustomerInfo {
            name: order.customer_name,
            email: order.customer_email,
            phone: order.customer_phone,
        },
        total: order.total,
        created_at: order.created_at,
        lines: lines
            .into_iter()
            .map(|l| OrderLineView {
                id: l.id,
                menu_item_id: l.menu_item_id,
                quantity: l.quantity,
                notes: l.notes,
                unit_price: l.unit_price,
            })
            .collect(),
    })
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Price every line from the catalog as it is right now
            let ids: Vec<i32> = draft.lines.iter().map(|l| l.menu_item_id).collect();
            let prices: HashMap<i32, BigDecimal> = menu_items::table
                .filter(menu_items::id.eq_any(ids))
                .select((menu_items::id, menu_items::price))
                .load::<(i32, BigDecimal)>(conn)?
                .into_iter()
                .collect();
            let priced = price_lines(&draft.lines, &prices)?;

            // 2. Draw the order number from the sequence; nextval never hands
            //    out the same value twice, even across concurrent transactions.
            let seq: i64 =
                diesel::select(sql::<BigInt>("nextval('order_number_seq')")).get_result(conn)?;

            // 3. Insert the order
            let order_id = Uuid::new_v4();
            let order = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    order_number: format_order_number(seq),
                    customer_name: draft.customer.name.trim().to_string(),
                    customer_email: draft.customer.email.clone(),
                    customer_phone: draft.customer.phone.clone(),
                    fulfillment_type: draft.fulfillment.mode().as_str().to_string(),
                    table_number: draft.fulfillment.table_number(),
                    delivery_address: draft.fulfillment.address().map(str::to_string),
                    payment_channel: draft.payment_channel.as_str().to_string(),
                    status: OrderStatus::Pending.as_str().to_string(),
                    total: priced.total,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 4. Insert its lines in the same transaction
            let new_lines: Vec<NewOrderItemRow> = priced
                .lines
                .into_iter()
                .enumerate()
                .map(|(position, l)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    menu_item_id: l.menu_item_id,
                    position: position as i32,
                    quantity: l.quantity,
                    notes: l.notes,
                    unit_price: l.unit_price,
                })
                .collect();
            let lines = diesel::insert_into(order_items::table)
                .values(&new_lines)
                .returning(OrderItemRow::as_returning())
                .get_results(conn)?;

            order_view(order, lines)
        })
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = OrderItemRow::belonging_to(&order)
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load(&mut conn)?;

        order_view(order, lines).map(Some)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;
            let Some(offset) = page_offset(page, limit) else {
                return Ok(ListResult {
                    items: vec![],
                    total,
                });
            };

            let rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::order_number.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| order_view(o, vec![]))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}
