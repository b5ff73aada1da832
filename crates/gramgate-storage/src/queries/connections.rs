// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection CRUD operations.

use gramgate_core::{Connection, GramgateError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

const COLUMNS: &str =
    "id, client_id, api_url, api_key, mg_url, mg_token, active, created_at, updated_at";

fn row_to_connection(row: &rusqlite::Row<'_>) -> rusqlite::Result<Connection> {
    Ok(Connection {
        id: row.get(0)?,
        client_id: row.get(1)?,
        api_url: row.get(2)?,
        api_key: row.get(3)?,
        mg_url: row.get(4)?,
        mg_token: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Create a new connection. Returns the assigned row ID.
pub async fn create_connection(db: &Database, conn: &Connection) -> Result<i64, GramgateError> {
    let conn = conn.clone();
    db.connection()
        .call(move |c| {
            c.execute(
                "INSERT INTO connections
                 (client_id, api_url, api_key, mg_url, mg_token, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    conn.client_id,
                    conn.api_url,
                    conn.api_key,
                    conn.mg_url,
                    conn.mg_token,
                    conn.active,
                    conn.created_at,
                    conn.updated_at,
                ],
            )?;
            Ok(c.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a connection by its opaque client identifier.
pub async fn get_by_client_id(
    db: &Database,
    client_id: &str,
) -> Result<Option<Connection>, GramgateError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!(
                "SELECT {COLUMNS} FROM connections WHERE client_id = ?1"
            ))?;
            match stmt.query_row(params![client_id], row_to_connection) {
                Ok(conn) => Ok(Some(conn)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a connection by row ID.
pub async fn get_by_id(db: &Database, id: i64) -> Result<Option<Connection>, GramgateError> {
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!("SELECT {COLUMNS} FROM connections WHERE id = ?1"))?;
            match stmt.query_row(params![id], row_to_connection) {
                Ok(conn) => Ok(Some(conn)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a connection by its CRM base URL.
pub async fn get_by_api_url(
    db: &Database,
    api_url: &str,
) -> Result<Option<Connection>, GramgateError> {
    let api_url = api_url.to_string();
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!(
                "SELECT {COLUMNS} FROM connections WHERE api_url = ?1"
            ))?;
            match stmt.query_row(params![api_url], row_to_connection) {
                Ok(conn) => Ok(Some(conn)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all connections currently marked active.
pub async fn list_active(db: &Database) -> Result<Vec<Connection>, GramgateError> {
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!(
                "SELECT {COLUMNS} FROM connections WHERE active = 1 ORDER BY id"
            ))?;
            let rows = stmt.query_map([], row_to_connection)?;
            let mut connections = Vec::new();
            for row in rows {
                connections.push(row?);
            }
            Ok(connections)
        })
        .await
        .map_err(map_tr_err)
}

/// Update a connection's credentials and activity, keyed by client ID.
pub async fn update_by_client_id(db: &Database, conn: &Connection) -> Result<(), GramgateError> {
    let conn = conn.clone();
    db.connection()
        .call(move |c| {
            c.execute(
                "UPDATE connections
                 SET api_url = ?1, api_key = ?2, mg_url = ?3, mg_token = ?4, active = ?5,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE client_id = ?6",
                params![
                    conn.api_url,
                    conn.api_key,
                    conn.mg_url,
                    conn.mg_token,
                    conn.active,
                    conn.client_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Flip a connection's active flag, optionally updating the CRM base URL
/// when the activity callback reports a new one.
pub async fn set_activity(
    db: &Database,
    client_id: &str,
    active: bool,
    api_url: Option<&str>,
) -> Result<(), GramgateError> {
    let client_id = client_id.to_string();
    let api_url = api_url.map(|s| s.to_string());
    db.connection()
        .call(move |c| {
            match api_url {
                Some(url) => c.execute(
                    "UPDATE connections
                     SET active = ?1, api_url = ?2,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE client_id = ?3",
                    params![active, url, client_id],
                )?,
                None => c.execute(
                    "UPDATE connections
                     SET active = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE client_id = ?2",
                    params![active, client_id],
                )?,
            };
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
