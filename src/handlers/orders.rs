use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::domain::order::{
    CustomerInfo, Fulfillment, OrderDraft, OrderLineInput, OrderLineView, OrderStatus, OrderView,
    PaymentChannel,
};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub menu_item_id: i32,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Order submission. Prices are never taken from the request; any extra
/// fields such as a client-side `unit_price` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub fulfillment: Fulfillment,
    #[serde(default)]
    pub payment_channel: PaymentChannel,
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    pub fn into_draft(self) -> OrderDraft {
        OrderDraft {
            customer: CustomerInfo {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            fulfillment: self.fulfillment,
            payment_channel: self.payment_channel,
            lines: self
                .items
                .into_iter()
                .map(|i| OrderLineInput {
                    menu_item_id: i.menu_item_id,
                    quantity: i.quantity,
                    notes: i.notes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub fulfillment: Fulfillment,
    pub payment_channel: PaymentChannel,
    pub status: OrderStatus,
    pub total: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub notes: Option<String>,
    pub unit_price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_number: String,
    /// Authoritative total computed from catalog prices, e.g. "9.75"
    pub total: String,
    /// `total` formatted in the deployment's currency, e.g. "$9.75"
    pub total_display: String,
    pub order: OrderResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailsResponse {
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

fn order_response(order: &OrderView) -> OrderResponse {
    OrderResponse {
        id: order.id,
        order_number: order.order_number.clone(),
        customer_name: order.customer.name.clone(),
        customer_email: order.customer.email.clone(),
        customer_phone: order.customer.phone.clone(),
        fulfillment: order.fulfillment.clone(),
        payment_channel: order.payment_channel,
        status: order.status,
        total: order.total.to_string(),
        created_at: order.created_at.to_rfc3339(),
    }
}

fn item_response(line: OrderLineView) -> OrderItemResponse {
    OrderItemResponse {
        id: line.id,
        menu_item_id: line.menu_item_id,
        quantity: line.quantity,
        notes: line.notes,
        unit_price: line.unit_price.to_string(),
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Validates the request, prices every line from the current catalog and
/// stores the order with its lines in a single transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Invalid order data or unknown menu item", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = body.into_inner().into_draft();
    let currency = state.currency;

    let order = web::block(move || state.orders.create_order(draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        order_number: order.order_number.clone(),
        total: order.total.to_string(),
        total_display: currency.format(&order.total),
        order: order_response(&order),
    }))
}

/// GET /orders/{order_number}
///
/// Returns the order together with its line items.
#[utoipa::path(
    get,
    path = "/orders/{order_number}",
    params(
        ("order_number" = String, Path, description = "Human-facing order number, e.g. ORD-001000"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderDetailsResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();

    let order = web::block(move || state.orders.get_order(&order_number))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let Some(mut order) = order else {
        return Err(AppError::NotFound("Order"));
    };

    let lines = std::mem::take(&mut order.lines);
    Ok(HttpResponse::Ok().json(OrderDetailsResponse {
        order: order_response(&order),
        items: lines.into_iter().map(item_response).collect(),
    }))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their lines), newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let result = web::block(move || state.orders.list_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.iter().map(order_response).collect(),
        total: result.total,
        page,
        limit,
    }))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use bigdecimal::BigDecimal;
    use serde_json::json;

    use super::*;
    use crate::currency::Currency;
    use crate::domain::order::OrderPolicy;
    use crate::errors::ErrorResponse;
    use crate::infrastructure::memory_store::InMemoryStore;
    use crate::infrastructure::seed::sample_menu;

    fn state_with(store: Arc<InMemoryStore>) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            store.clone(),
            store,
            OrderPolicy::default(),
            Currency::Usd,
        ))
    }

    fn espresso_and_latte() -> serde_json::Value {
        json!({
            "customer_name": "Ana",
            "customer_email": "ana@example.com",
            "fulfillment": { "type": "pickup" },
            "items": [
                { "menu_item_id": 1, "quantity": 2, "notes": "", "unit_price": "0.01" },
                { "menu_item_id": 3, "quantity": 1, "notes": "oat milk" }
            ]
        })
    }

    #[actix_web::test]
    async fn create_order_uses_catalog_prices() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(espresso_and_latte())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: CreateOrderResponse = test::read_body_json(resp).await;
        assert_eq!(body.order_number, "ORD-001000");
        let total = BigDecimal::from_str(&body.total).expect("decimal");
        assert_eq!(total, BigDecimal::from_str("9.75").expect("decimal"));
        assert_eq!(body.total_display, "$9.75");
        assert_eq!(body.order.status, OrderStatus::Pending);
        assert_eq!(body.order.payment_channel, PaymentChannel::Cash);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", body.order_number))
            .to_request();
        let details: OrderDetailsResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.items[0].unit_price, "2.50");
        assert_eq!(details.items[0].notes, None);
        assert_eq!(details.items[1].unit_price, "4.75");
        assert_eq!(details.items[1].notes.as_deref(), Some("oat milk"));
    }

    #[actix_web::test]
    async fn validation_errors_list_fields() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_name": "",
                "customer_email": "ana@example.com",
                "fulfillment": { "type": "table", "table_number": 0 },
                "items": []
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        let fields: Vec<_> = body.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["customer_name", "fulfillment.table_number", "items"]
        );
        assert_eq!(store.order_count().expect("count"), 0);
    }

    #[actix_web::test]
    async fn values_too_large_to_store_are_a_bad_request() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_name": "x".repeat(300),
                "customer_email": format!("{}@example.com", "a".repeat(300)),
                "fulfillment": { "type": "pickup" },
                "items": [
                    { "menu_item_id": 5, "quantity": i32::MAX }
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        let fields: Vec<_> = body.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["customer_name", "customer_email", "items[0].quantity"]
        );
        assert_eq!(store.order_count().expect("count"), 0);
    }

    #[actix_web::test]
    async fn unknown_menu_item_is_rejected_atomically() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "customer_name": "Ana",
                "customer_email": "ana@example.com",
                "fulfillment": { "type": "pickup" },
                "items": [
                    { "menu_item_id": 1, "quantity": 1 },
                    { "menu_item_id": 500, "quantity": 1 }
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Menu item 500 not found");
        assert_eq!(store.order_count().expect("count"), 0);
    }

    #[actix_web::test]
    async fn malformed_json_gets_json_error_body() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store))
                .app_data(crate::json_config())
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"customer_name\": 5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn unknown_order_number_is_404() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app =
            test::init_service(App::new().app_data(state_with(store)).configure(crate::routes))
                .await;

        let req = test::TestRequest::get().uri("/orders/ORD-424242").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn list_orders_paginates() {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        let app = test::init_service(
            App::new()
                .app_data(state_with(store.clone()))
                .configure(crate::routes),
        )
        .await;

        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/orders")
                .set_json(espresso_and_latte())
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::CREATED
            );
        }

        let req = test::TestRequest::get()
            .uri("/orders?page=2&limit=2")
            .to_request();
        let body: ListOrdersResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.total, 3);
        assert_eq!(body.page, 2);
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].order_number, "ORD-001000");

        let req = test::TestRequest::get()
            .uri(&format!("/orders?page={}&limit=100", i64::MAX))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ListOrdersResponse = test::read_body_json(resp).await;
        assert_eq!(body.total, 3);
        assert!(body.items.is_empty());
    }
}
