// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached end-user profile operations.

use gramgate_core::{GramgateError, TgUser};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<TgUser> {
    Ok(TgUser {
        id: row.get(0)?,
        external_id: row.get(1)?,
        photo_url: row.get(2)?,
        photo_id: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Get a cached user profile by the Telegram user ID.
pub async fn get_by_external_id(
    db: &Database,
    external_id: i64,
) -> Result<Option<TgUser>, GramgateError> {
    db.connection()
        .call(move |c| {
            let mut stmt = c.prepare(
                "SELECT id, external_id, photo_url, photo_id, updated_at
                 FROM tg_users WHERE external_id = ?1",
            )?;
            match stmt.query_row(params![external_id], row_to_user) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or refresh a cached profile, keyed by the external user ID.
///
/// Photo URL and photo ID are always written together with the caller's
/// timestamp; a partial update could leave the URL pointing at a stale
/// avatar identity.
pub async fn upsert(db: &Database, user: &TgUser) -> Result<(), GramgateError> {
    let user = user.clone();
    db.connection()
        .call(move |c| {
            c.execute(
                "INSERT INTO tg_users (external_id, photo_url, photo_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(external_id) DO UPDATE SET
                     photo_url = excluded.photo_url,
                     photo_id = excluded.photo_id,
                     updated_at = excluded.updated_at",
                params![user.external_id, user.photo_url, user.photo_id, user.updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramgate_core::types::now_rfc3339;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let (db, _dir) = setup_db().await;

        let user = TgUser {
            external_id: 42,
            photo_url: "https://cdn.example.com/a.jpg".into(),
            photo_id: "file-1".into(),
            updated_at: now_rfc3339(),
            ..Default::default()
        };
        upsert(&db, &user).await.unwrap();

        let refreshed = TgUser {
            external_id: 42,
            photo_url: "https://cdn.example.com/b.jpg".into(),
            photo_id: "file-2".into(),
            updated_at: now_rfc3339(),
            ..Default::default()
        };
        upsert(&db, &refreshed).await.unwrap();

        let got = get_by_external_id(&db, 42).await.unwrap().unwrap();
        assert_eq!(got.photo_id, "file-2");
        assert_eq!(got.photo_url, "https://cdn.example.com/b.jpg");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_by_external_id(&db, 7).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
