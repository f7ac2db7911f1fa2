use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::menu::MenuItem;

use super::api_client::ClientError;

/// Where the storefront gets its catalog from.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ClientError>;

    async fn fetch_menu_item(&self, id: i32) -> Result<Option<MenuItem>, ClientError>;
}

#[async_trait]
impl<T: MenuSource + ?Sized> MenuSource for Arc<T> {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ClientError> {
        (**self).fetch_menu().await
    }

    async fn fetch_menu_item(&self, id: i32) -> Result<Option<MenuItem>, ClientError> {
        (**self).fetch_menu_item(id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched catalog replaced the cache; holds the item count.
    Applied(usize),
    /// A newer refresh had already been applied, so this response was dropped.
    Stale,
}

#[derive(Debug, Default)]
struct Catalog {
    items: Vec<MenuItem>,
    applied: u64,
}

/// Cached catalog for the storefront.
///
/// Refreshes may overlap. Each one takes a ticket when it starts and its
/// response only lands if no later ticket has landed first.
pub struct MenuProvider<S> {
    source: S,
    catalog: RwLock<Catalog>,
    generation: AtomicU64,
}

impl<S: MenuSource> MenuProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            catalog: RwLock::new(Catalog::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, ClientError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let items = self.source.fetch_menu().await?;

        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        if ticket <= catalog.applied {
            log::debug!(
                "Dropping menu refresh #{} (#{} already applied)",
                ticket,
                catalog.applied
            );
            return Ok(RefreshOutcome::Stale);
        }
        let count = items.len();
        catalog.items = items;
        catalog.applied = ticket;
        log::info!("Menu refreshed: {} items", count);
        Ok(RefreshOutcome::Applied(count))
    }

    /// Ask the source for one item, bypassing the cache.
    pub async fn fetch_item(&self, id: i32) -> Result<Option<MenuItem>, ClientError> {
        self.source.fetch_menu_item(id).await
    }

    pub fn items(&self) -> Vec<MenuItem> {
        self.read(|c| c.items.clone())
    }

    pub fn find(&self, id: i32) -> Option<MenuItem> {
        self.read(|c| c.items.iter().find(|i| i.id == id).cloned())
    }

    pub fn by_category(&self, category: &str) -> Vec<MenuItem> {
        self.read(|c| {
            c.items
                .iter()
                .filter(|i| i.category == category)
                .cloned()
                .collect()
        })
    }

    /// Distinct categories in the cached catalog, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.read(|c| {
            c.items
                .iter()
                .map(|i| i.category.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Catalog) -> T) -> T {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        f(&catalog)
    }
}
