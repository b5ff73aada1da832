// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Gramgate transport bridge.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed CRUD
//! operations for connections, bots and cached end-user profiles. Every
//! update is a single-row conditional statement keyed by a unique natural
//! key (token, client ID, external user ID); there are no long-lived
//! transactions, and last-writer-wins is the accepted consistency model.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;
