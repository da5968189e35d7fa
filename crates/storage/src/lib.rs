pub mod db;

pub use db::{create_db, create_memory_db, ApplianceStore, DbPool};
