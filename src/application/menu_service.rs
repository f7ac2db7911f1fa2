use crate::domain::errors::DomainError;
use crate::domain::menu::{MenuItem, NewMenuItem};
use crate::domain::ports::MenuRepository;

pub struct MenuService<R> {
    repo: R,
}

impl<R: MenuRepository> MenuService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.repo.list(category)
    }

    pub fn get(&self, id: i32) -> Result<Option<MenuItem>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Fill an empty catalog with `items`. A catalog that already has entries
    /// is left untouched; returns how many items were inserted.
    pub fn seed_if_empty(&self, items: Vec<NewMenuItem>) -> Result<usize, DomainError> {
        let existing = self.repo.count()?;
        if existing > 0 {
            log::info!("Menu already has {} item(s), skipping seed", existing);
            return Ok(0);
        }
        let inserted = self.repo.insert_many(items)?;
        log::info!("Seeded menu with {} item(s)", inserted);
        Ok(inserted)
    }
}
