//! # Spacedock Core
//!
//! Domain types, traits, and error definitions for Spacedock, the local
//! mirror of SpaceTraders agents. This crate has **no framework
//! dependencies**: it defines the model that the store, remote client,
//! reconciler and gateway crates implement against.
//!
//! ## Seams
//!
//! The two external collaborators are traits here:
//! - [`GameClient`]: the remote SpaceTraders API
//! - [`AgentStore`]: the local relational store
//!
//! Implementations live in `spacedock-remote` and `spacedock-store`.

pub mod agent;
pub mod classify;
pub mod error;
pub mod remote;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, CreateAgentRequest};
pub use classify::{classify, classify_persistence};
pub use error::{Error, ErrorKind, PersistenceError, RemoteError, Result};
pub use remote::{
    AgentLookup, Faction, GameClient, RegisterRequest, Registration, RemoteAgent, ServerResets,
    ServerStatus,
};
pub use store::AgentStore;
