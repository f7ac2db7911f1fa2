use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, ParseBigDecimalError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::menu::MenuItem;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "4.75"
    pub price: String,
    pub image: String,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            category: item.category,
            price: item.price.to_string(),
            image: item.image,
        }
    }
}

impl TryFrom<MenuItemResponse> for MenuItem {
    type Error = ParseBigDecimalError;

    fn try_from(item: MenuItemResponse) -> Result<Self, Self::Error> {
        Ok(MenuItem {
            price: BigDecimal::from_str(&item.price)?,
            id: item.id,
            name: item.name,
            description: item.description,
            category: item.category,
            image: item.image,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /menu
///
/// Returns the full catalog, optionally narrowed to one category.
#[utoipa::path(
    get,
    path = "/menu",
    params(
        ("category" = Option<String>, Query, description = "Only items in this category"),
    ),
    responses(
        (status = 200, description = "Menu items", body = [MenuItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn list_menu(
    state: web::Data<AppState>,
    query: web::Query<MenuQuery>,
) -> Result<HttpResponse, AppError> {
    let category = query.into_inner().category;

    let items = web::block(move || state.menu.list(category.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<MenuItemResponse> = items.into_iter().map(MenuItemResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /menu/{id}
#[utoipa::path(
    get,
    path = "/menu/{id}",
    params(
        ("id" = i32, Path, description = "Menu item id"),
    ),
    responses(
        (status = 200, description = "Menu item found", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "menu"
)]
pub async fn get_menu_item(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let item = web::block(move || state.menu.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match item {
        Some(item) => Ok(HttpResponse::Ok().json(MenuItemResponse::from(item))),
        None => Err(AppError::NotFound("Menu item")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use super::*;
    use crate::currency::Currency;
    use crate::domain::order::OrderPolicy;
    use crate::infrastructure::memory_store::InMemoryStore;
    use crate::infrastructure::seed::sample_menu;

    fn state() -> web::Data<AppState> {
        let store = Arc::new(InMemoryStore::with_menu(sample_menu()));
        web::Data::new(AppState::new(
            store.clone(),
            store,
            OrderPolicy::default(),
            Currency::Usd,
        ))
    }

    #[actix_web::test]
    async fn menu_lists_every_item_with_string_prices() {
        let app = test::init_service(App::new().app_data(state()).configure(crate::routes)).await;

        let req = test::TestRequest::get().uri("/menu").to_request();
        let body: Vec<MenuItemResponse> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.len(), 9);
        assert_eq!(body[0].name, "Espresso");
        assert_eq!(body[0].price, "2.50");
    }

    #[actix_web::test]
    async fn menu_list_alias_and_category_filter() {
        let app = test::init_service(App::new().app_data(state()).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/menu-list?category=tea")
            .to_request();
        let body: Vec<MenuItemResponse> = test::call_and_read_body_json(&app, req).await;

        let names: Vec<_> = body.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Green Tea", "Earl Grey"]);
    }

    #[actix_web::test]
    async fn unknown_menu_item_is_404() {
        let app = test::init_service(App::new().app_data(state()).configure(crate::routes)).await;

        let req = test::TestRequest::get().uri("/menu/77").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn single_menu_item_converts_back_to_domain() {
        let app = test::init_service(App::new().app_data(state()).configure(crate::routes)).await;

        let req = test::TestRequest::get().uri("/menu/3").to_request();
        let body: MenuItemResponse = test::call_and_read_body_json(&app, req).await;
        let item = MenuItem::try_from(body).expect("valid price");

        assert_eq!(item.name, "Latte");
        assert_eq!(item.price, BigDecimal::from_str("4.75").expect("decimal"));
    }
}
