//! Relay services used by the websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the relay's rules: connection bookkeeping, the shared
//! activity, command classification, and per-message dispatch. Route
//! handlers stay focused on protocol translation.

pub mod activity;
pub mod command;
pub mod dispatch;
pub mod lifecycle;
pub mod registry;
