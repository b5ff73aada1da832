// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot CRUD operations.
//!
//! The bot token is the globally unique natural key; CRM channel IDs are
//! only unique within one connection.

use gramgate_core::{Bot, GramgateError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

const COLUMNS: &str =
    "id, connection_id, channel_id, settings_hash, token, name, lang, created_at, updated_at";

fn row_to_bot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bot> {
    Ok(Bot {
        id: row.get(0)?,
        connection_id: row.get(1)?,
        channel_id: row.get::<_, i64>(2)? as u64,
        settings_hash: row.get(3)?,
        token: row.get(4)?,
        name: row.get(5)?,
        lang: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Create a new bot. Returns the assigned row ID.
///
/// Fails with a constraint violation if a bot with the same token already
/// exists; callers check uniqueness first to report a friendlier error.
pub async fn create_bot(db: &Database, bot: &Bot) -> Result<i64, GramgateError> {
    let bot = bot.clone();
    db.connection()
        .call(move |c| {
            c.execute(
                "INSERT INTO bots
                 (connection_id, channel_id, settings_hash, token, name, lang, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    bot.connection_id,
                    bot.channel_id as i64,
                    bot.settings_hash,
                    bot.token,
                    bot.name,
                    bot.lang,
                    bot.created_at,
                    bot.updated_at,
                ],
            )?;
            Ok(c.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a bot by its token.
pub async fn get_by_token(db: &Database, token: &str) -> Result<Option<Bot>, GramgateError> {
    let token = token.to_string();
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!("SELECT {COLUMNS} FROM bots WHERE token = ?1"))?;
            match stmt.query_row(params![token], row_to_bot) {
                Ok(bot) => Ok(Some(bot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a bot by the CRM channel it is registered as, scoped to one
/// connection.
pub async fn get_by_channel(
    db: &Database,
    connection_id: i64,
    channel_id: u64,
) -> Result<Option<Bot>, GramgateError> {
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!(
                "SELECT {COLUMNS} FROM bots WHERE connection_id = ?1 AND channel_id = ?2"
            ))?;
            match stmt.query_row(params![connection_id, channel_id as i64], row_to_bot) {
                Ok(bot) => Ok(Some(bot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all bots owned by a connection.
pub async fn list_by_connection(
    db: &Database,
    connection_id: i64,
) -> Result<Vec<Bot>, GramgateError> {
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(&format!(
                "SELECT {COLUMNS} FROM bots WHERE connection_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![connection_id], row_to_bot)?;
            let mut bots = Vec::new();
            for row in rows {
                bots.push(row?);
            }
            Ok(bots)
        })
        .await
        .map_err(map_tr_err)
}

/// Record the settings fingerprint the CRM last acknowledged for a bot.
pub async fn update_settings_hash(
    db: &Database,
    token: &str,
    settings_hash: &str,
) -> Result<(), GramgateError> {
    let token = token.to_string();
    let settings_hash = settings_hash.to_string();
    db.connection()
        .call(move |c| {
            c.execute(
                "UPDATE bots SET settings_hash = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE token = ?2",
                params![settings_hash, token],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Update a bot's preferred language.
pub async fn update_lang(db: &Database, token: &str, lang: &str) -> Result<(), GramgateError> {
    let token = token.to_string();
    let lang = lang.to_string();
    db.connection()
        .call(move |c| {
            c.execute(
                "UPDATE bots SET lang = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE token = ?2",
                params![lang, token],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Hard-delete a bot by token. Returns the number of rows removed.
pub async fn delete_by_token(db: &Database, token: &str) -> Result<usize, GramgateError> {
    let token = token.to_string();
    db.connection()
        .call(move |c| {
            let deleted = c.execute("DELETE FROM bots WHERE token = ?1", params![token])?;
            Ok(deleted)
        })
        .await
        .map_err(map_tr_err)
}
