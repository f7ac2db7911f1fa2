use bigdecimal::{BigDecimal, Zero};
use indexmap::map::Entry;
use indexmap::IndexMap;
use thiserror::Error;

use crate::domain::menu::MenuItem;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),
    #[error("Quantity is too large")]
    QuantityOverflow,
}

/// Identity of a cart line: the menu item plus the customer's notes.
///
/// Absent notes and empty notes are the same key; anything else compares by
/// exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    menu_item_id: i32,
    notes: String,
}

impl LineKey {
    pub fn new(menu_item_id: i32, notes: Option<&str>) -> Self {
        Self {
            menu_item_id,
            notes: notes.unwrap_or_default().to_string(),
        }
    }

    pub fn menu_item_id(&self) -> i32 {
        self.menu_item_id
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// One cart entry. Price, name and image are snapshots taken when the item
/// was added; later catalog changes do not reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub menu_item_id: i32,
    pub name: String,
    pub image: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub notes: String,
}

impl CartLineItem {
    pub fn from_menu_item(item: &MenuItem, quantity: i32, notes: Option<&str>) -> Self {
        Self {
            menu_item_id: item.id,
            name: item.name.clone(),
            image: item.image.clone(),
            unit_price: item.price.clone(),
            quantity,
            notes: notes.unwrap_or_default().to_string(),
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.menu_item_id, Some(&self.notes))
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// Line items for one customer session, in the order they were first added.
///
/// Keyed by [`LineKey`] so merging is a single lookup; no two lines ever
/// share a key.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: IndexMap<LineKey, CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `item`, or fold its quantity into the line with the same key.
    ///
    /// A merged line keeps the snapshot it was first added with.
    pub fn add(&mut self, item: CartLineItem) -> Result<&CartLineItem, CartError> {
        if item.quantity < 1 {
            return Err(CartError::InvalidQuantity(item.quantity));
        }
        match self.lines.entry(item.key()) {
            Entry::Occupied(entry) => {
                let line = entry.into_mut();
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CartError::QuantityOverflow)?;
                Ok(line)
            }
            Entry::Vacant(entry) => Ok(entry.insert(item)),
        }
    }

    pub fn add_menu_item(
        &mut self,
        item: &MenuItem,
        quantity: i32,
        notes: Option<&str>,
    ) -> Result<&CartLineItem, CartError> {
        self.add(CartLineItem::from_menu_item(item, quantity, notes))
    }

    /// Remove the line with `key`; absent keys are ignored.
    pub fn remove(&mut self, key: &LineKey) -> Option<CartLineItem> {
        self.lines.shift_remove(key)
    }

    /// Set a line's quantity exactly. Zero or less removes the line.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i32) {
        if quantity <= 0 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.lines.get_mut(key) {
            line.quantity = quantity;
        }
    }

    /// Take `quantity` off the line with `key`, removing the line when
    /// nothing is left. Absent keys are ignored.
    pub fn deduct(&mut self, key: &LineKey, quantity: i32) {
        let Some(line) = self.lines.get(key) else {
            return;
        };
        let remaining = line.quantity.saturating_sub(quantity);
        self.update_quantity(key, remaining);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn get(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.lines.get(key)
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLineItem> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.values().map(|l| i64::from(l.quantity)).sum()
    }

    pub fn total(&self) -> BigDecimal {
        self.lines
            .values()
            .fold(BigDecimal::zero(), |acc, line| acc + line.line_total())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn line(id: i32, price: &str, quantity: i32, notes: &str) -> CartLineItem {
        CartLineItem {
            menu_item_id: id,
            name: format!("item-{}", id),
            image: String::new(),
            unit_price: dec(price),
            quantity,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn same_item_and_notes_merge_in_either_order() {
        let mut a = Cart::new();
        a.add(line(1, "2.50", 2, "")).expect("add");
        a.add(line(1, "2.50", 3, "")).expect("add");

        let mut b = Cart::new();
        b.add(line(1, "2.50", 3, "")).expect("add");
        b.add(line(1, "2.50", 2, "")).expect("add");

        for cart in [a, b] {
            assert_eq!(cart.len(), 1);
            assert_eq!(cart.get(&LineKey::new(1, None)).expect("line").quantity, 5);
        }
    }

    #[test]
    fn different_notes_stay_separate() {
        let mut cart = Cart::new();
        cart.add(line(3, "4.75", 1, "oat milk")).expect("add");
        cart.add(line(3, "4.75", 1, "Oat milk")).expect("add");
        cart.add(line(3, "4.75", 1, "")).expect("add");

        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn empty_and_absent_notes_are_one_key() {
        assert_eq!(LineKey::new(1, None), LineKey::new(1, Some("")));
        assert_ne!(LineKey::new(1, Some(" ")), LineKey::new(1, None));
    }

    #[test]
    fn merge_keeps_the_first_snapshot() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 1, "")).expect("add");
        cart.add(line(1, "9.99", 1, "")).expect("add");

        let merged = cart.get(&LineKey::new(1, None)).expect("line");
        assert_eq!(merged.unit_price, dec("2.50"));
        assert_eq!(merged.quantity, 2);
    }

    #[test]
    fn non_positive_add_is_rejected_without_change() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 1, "")).expect("add");

        assert_eq!(
            cart.add(line(1, "2.50", 0, "")).unwrap_err(),
            CartError::InvalidQuantity(0)
        );
        assert_eq!(
            cart.add(line(2, "2.50", -3, "")).unwrap_err(),
            CartError::InvalidQuantity(-3)
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn overflowing_merge_is_rejected() {
        let mut cart = Cart::new();
        cart.add(line(1, "1.00", i32::MAX, "")).expect("add");

        assert_eq!(
            cart.add(line(1, "1.00", 1, "")).unwrap_err(),
            CartError::QuantityOverflow
        );
        assert_eq!(cart.item_count(), i64::from(i32::MAX));
    }

    #[test]
    fn update_to_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 2, "")).expect("add");
        cart.add(line(2, "4.25", 1, "")).expect("add");

        cart.update_quantity(&LineKey::new(1, None), 0);
        cart.update_quantity(&LineKey::new(2, None), -1);

        assert!(cart.is_empty());
    }

    #[test]
    fn update_sets_quantity_and_keeps_order() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 1, "")).expect("add");
        cart.add(line(2, "4.25", 1, "")).expect("add");
        cart.add(line(3, "4.75", 1, "")).expect("add");

        cart.update_quantity(&LineKey::new(2, None), 7);

        let ids: Vec<_> = cart.lines().map(|l| (l.menu_item_id, l.quantity)).collect();
        assert_eq!(ids, vec![(1, 1), (2, 7), (3, 1)]);
    }

    #[test]
    fn remove_absent_is_a_noop_and_removal_keeps_order() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 1, "")).expect("add");
        cart.add(line(2, "4.25", 1, "")).expect("add");
        cart.add(line(3, "4.75", 1, "")).expect("add");

        assert!(cart.remove(&LineKey::new(9, Some("nope"))).is_none());
        assert!(cart.remove(&LineKey::new(2, None)).is_some());

        let ids: Vec<_> = cart.lines().map(|l| l.menu_item_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn total_is_exact() {
        let mut cart = Cart::new();
        cart.add(line(2, "4.25", 2, "")).expect("add");
        cart.add(line(1, "2.50", 1, "")).expect("add");

        assert_eq!(cart.total(), dec("11.00"));
        assert_eq!(cart.total().to_string(), "11.00");
    }

    #[test]
    fn espresso_and_latte_total() {
        let espresso = MenuItem {
            id: 1,
            name: "Espresso".to_string(),
            description: None,
            category: "coffee".to_string(),
            price: dec("2.50"),
            image: "espresso.jpg".to_string(),
        };
        let latte = MenuItem {
            id: 3,
            name: "Latte".to_string(),
            price: dec("4.75"),
            image: "latte.jpg".to_string(),
            ..espresso.clone()
        };

        let mut cart = Cart::new();
        cart.add_menu_item(&espresso, 2, Some("")).expect("add");
        cart.add_menu_item(&latte, 1, Some("oat milk")).expect("add");

        assert_eq!(cart.total(), dec("9.75"));
        assert_eq!(cart.item_count(), 3);
        let first = cart.lines().next().expect("line");
        assert_eq!(first.name, "Espresso");
        assert_eq!(first.image, "espresso.jpg");
    }

    #[test]
    fn deduct_lowers_or_removes_lines() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 3, "")).expect("add");
        cart.add(line(2, "4.25", 1, "")).expect("add");

        cart.deduct(&LineKey::new(1, None), 2);
        cart.deduct(&LineKey::new(2, None), 1);
        cart.deduct(&LineKey::new(9, None), 1);

        let left: Vec<_> = cart.lines().map(|l| (l.menu_item_id, l.quantity)).collect();
        assert_eq!(left, vec![(1, 1)]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cart = Cart::new();
        cart.add(line(1, "2.50", 1, "")).expect("add");
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), BigDecimal::zero());
    }
}
