//! # Context Relay Core
//!
//! Shared logic for Context Relay with no network, database, or filesystem
//! dependencies: the data model and wire types, file classification,
//! context and prompt building, the legacy prompt parser, and the
//! interaction log abstraction.

pub mod context;
pub mod legacy;
pub mod log;
pub mod models;
pub mod wire;
