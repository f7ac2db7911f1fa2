use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuItem, NewMenuItem};
use crate::domain::ports::MenuRepository;
use crate::schema::menu_items;

use super::models::{MenuItemRow, NewMenuItemRow};

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            image: row.image,
        }
    }
}

pub struct DieselMenuRepository {
    pool: DbPool,
}

impl DieselMenuRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MenuRepository for DieselMenuRepository {
    fn list(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = menu_items::table
            .select(MenuItemRow::as_select())
            .order(menu_items::id.asc())
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(menu_items::category.eq(category));
        }

        Ok(query
            .load(&mut conn)?
            .into_iter()
            .map(MenuItem::from)
            .collect())
    }

    fn find_by_id(&self, id: i32) -> Result<Option<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = menu_items::table
            .filter(menu_items::id.eq(id))
            .select(MenuItemRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(MenuItem::from))
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(menu_items::table.count().get_result(&mut conn)?)
    }

    fn insert_many(&self, items: Vec<NewMenuItem>) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<NewMenuItemRow> = items
            .into_iter()
            .map(|item| NewMenuItemRow {
                name: item.name,
                description: item.description,
                category: item.category,
                price: item.price,
                image: item.image,
            })
            .collect();

        Ok(diesel::insert_into(menu_items::table)
            .values(&rows)
            .execute(&mut conn)?)
    }
}
