//! Post and user storage: PostgreSQL via SeaORM, plus an in-memory store.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_repo;
#[cfg(feature = "postgres")]
mod schema;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresPostRepository, PostgresUserRepository};
#[cfg(feature = "postgres")]
pub use schema::ensure_schema;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
