//! Remote game client implementations for Spacedock.
//!
//! All clients implement the `spacedock_core::GameClient` trait.

pub mod spacetraders;

pub use spacetraders::SpaceTradersClient;
