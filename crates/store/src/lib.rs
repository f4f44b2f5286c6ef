//! Agent store implementations for Spacedock.

pub mod in_memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
