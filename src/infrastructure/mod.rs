pub mod memory_store;
pub mod menu_repo;
pub mod models;
pub mod order_repo;
pub mod seed;
