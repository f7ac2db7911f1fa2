pub mod menu;
pub mod orders;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        menu::list_menu,
        menu::get_menu_item,
        orders::create_order,
        orders::get_order,
        orders::list_orders,
    ),
    tags(
        (name = "menu", description = "Catalog of purchasable items"),
        (name = "orders", description = "Order submission and lookup"),
    )
)]
pub struct ApiDoc;
