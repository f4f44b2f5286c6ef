//! Agent reconciliation for Spacedock.
//!
//! The [`AgentReconciler`] is the only component that talks to both the
//! remote game and the local store:
//!
//! 1. **Create** validates input, fills defaults (credits, expiry from the
//!    next server reset) and persists the agent
//! 2. **Refresh** looks the call sign up remotely, registering unknown
//!    agents and creating their local record
//!
//! Errors leave the reconciler already classified into an
//! [`ErrorKind`](spacedock_core::ErrorKind); raw store errors never escape.

pub mod reconciler;

pub use reconciler::{AgentReconciler, DEFAULT_REGISTER_FACTION};
