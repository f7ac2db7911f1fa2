use bigdecimal::BigDecimal;

/// A purchasable catalog entry. Read-only to the ordering workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: BigDecimal,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: BigDecimal,
    pub image: String,
}
