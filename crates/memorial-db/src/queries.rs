use crate::Database;
use crate::models::TributeRow;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use uuid::Uuid;

/// Fields of a tribute as submitted; `id` and `created_at` are assigned here.
pub struct NewTribute<'a> {
    pub name: &'a str,
    pub relationship: Option<&'a str>,
    pub message: &'a str,
    pub photo_url: Option<&'a str>,
    pub publish_approved: bool,
    pub consent: bool,
}

impl Database {
    /// Insert one tribute. The store assigns `id` and `created_at` and
    /// returns the full persisted record.
    pub fn insert_tribute(&self, new: NewTribute<'_>) -> Result<TributeRow> {
        let row = TributeRow {
            id: Uuid::new_v4().to_string(),
            name: new.name.to_string(),
            relationship: new.relationship.map(str::to_string),
            message: new.message.to_string(),
            photo_url: new.photo_url.map(str::to_string),
            publish_approved: new.publish_approved,
            consent: new.consent,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tributes
                     (id, name, relationship, message, photo_url, publish_approved, consent, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    row.id,
                    row.name,
                    row.relationship,
                    row.message,
                    row.photo_url,
                    row.publish_approved,
                    row.consent,
                    row.created_at,
                ],
            )?;
            Ok(())
        })?;

        Ok(row)
    }

    /// One page of tributes plus the total matching count. Newest first;
    /// equal timestamps fall back to `id` descending so paging is stable.
    pub fn list_tributes(
        &self,
        approved_only: bool,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<TributeRow>, u64)> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        self.with_conn(|conn| {
            let total = count_tributes(conn, approved_only)?;
            let rows = query_tributes(conn, approved_only, limit, offset)?;
            Ok((rows, total))
        })
    }
}

fn count_tributes(conn: &Connection, approved_only: bool) -> Result<u64> {
    let sql = if approved_only {
        "SELECT COUNT(*) FROM tributes WHERE publish_approved = 1"
    } else {
        "SELECT COUNT(*) FROM tributes"
    };
    let total: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(total as u64)
}

fn query_tributes(
    conn: &Connection,
    approved_only: bool,
    limit: u32,
    offset: i64,
) -> Result<Vec<TributeRow>> {
    let sql = format!(
        "SELECT id, name, relationship, message, photo_url, publish_approved, consent, created_at
         FROM tributes
         {}
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2",
        if approved_only { "WHERE publish_approved = 1" } else { "" },
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![limit, offset], |row| {
            Ok(TributeRow {
                id: row.get(0)?,
                name: row.get(1)?,
                relationship: row.get(2)?,
                message: row.get(3)?,
                photo_url: row.get(4)?,
                publish_approved: row.get(5)?,
                consent: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
