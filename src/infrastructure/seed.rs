use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::domain::menu::NewMenuItem;

const SAMPLE_MENU: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Espresso",
        "2.50",
        "coffee",
        "Rich, bold espresso shot with a perfect crema",
        "https://images.unsplash.com/photo-1510707577719-ae7c14805e3a?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Cappuccino",
        "4.25",
        "coffee",
        "Espresso with steamed milk and rich foam",
        "https://images.unsplash.com/photo-1572442388796-11668a67e53d?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Latte",
        "4.75",
        "coffee",
        "Smooth espresso with steamed milk and light foam",
        "https://images.unsplash.com/photo-1561882468-9110e03e0f78?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Americano",
        "3.50",
        "coffee",
        "Espresso with hot water for a clean, bold taste",
        "https://images.unsplash.com/photo-1551024506-0bccd828d307?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Mocha",
        "5.25",
        "coffee",
        "Espresso with chocolate and steamed milk",
        "https://images.unsplash.com/photo-1578662996442-48f60103fc96?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Green Tea",
        "2.75",
        "tea",
        "Fresh green tea with antioxidants",
        "https://images.unsplash.com/photo-1556881286-04b2e18ac751?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Earl Grey",
        "3.00",
        "tea",
        "Classic black tea with bergamot oil",
        "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Croissant",
        "3.25",
        "pastries",
        "Buttery, flaky French pastry",
        "https://images.unsplash.com/photo-1555507036-ab794f0ec0c4?auto=format&fit=crop&w=400&h=300",
    ),
    (
        "Blueberry Muffin",
        "2.95",
        "pastries",
        "Fresh baked muffin with blueberries",
        "https://images.unsplash.com/photo-1586985289688-ca3cf47d3e6e?auto=format&fit=crop&w=400&h=300",
    ),
];

/// The starter catalog inserted into an empty store.
pub fn sample_menu() -> Vec<NewMenuItem> {
    SAMPLE_MENU
        .iter()
        .filter_map(|(name, price, category, description, image)| {
            // Literal prices above; a parse failure would be a typo, so skip it.
            let price = BigDecimal::from_str(price).ok()?;
            Some(NewMenuItem {
                name: name.to_string(),
                description: Some(description.to_string()),
                category: category.to_string(),
                price,
                image: image.to_string(),
            })
        })
        .collect()
}
