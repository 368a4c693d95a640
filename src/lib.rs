//! # Context Relay
//!
//! Ask a hosted language model questions about a local file.
//!
//! The client reads and classifies a file, extracts its text (page by page
//! for PDFs), and sends a prompt built from a fixed-length preview plus the
//! question to the relay server. The relay forwards the prompt to the Gemini
//! API, records the exchange in a SQLite interaction log, and returns the
//! answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  POST /api/query  ┌─────────┐  generateContent  ┌──────────┐
//! │ relay ask    │──────────────────▶│  Relay  │──────────────────▶│  Gemini  │
//! │ read+context │◀──────────────────│ (axum)  │◀──────────────────│   API    │
//! └──────────────┘     {answer}      └────┬────┘                   └──────────┘
//!                                         │ append
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │    SQLite    │
//!                                  │ interactions │
//!                                  └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`extract`] | PDF text extraction |
//! | [`reader`] | Reading and classifying local files |
//! | [`client`] | Prompt assembly and the relay HTTP client |
//! | [`model`] | Gemini API client |
//! | [`relay`] | Query handling and interaction logging |
//! | [`server`] | HTTP server |
//! | [`sqlite_log`] | SQLite interaction log |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`history`] | Printing recent interactions |

pub mod client;
pub mod config;
pub mod db;
pub mod extract;
pub mod history;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod reader;
pub mod relay;
pub mod server;
pub mod sqlite_log;
