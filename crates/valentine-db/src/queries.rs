use crate::Database;
use crate::models::{NewRequestRow, RequestRow};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Row};

const REQUEST_COLUMNS: &str = "id, sender_name, recipient_name, message, custom_message, \
     gift, theme, music, accepted, created_at, updated_at";

/// Result of writing the `accepted` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The row changed; carries the row after the write.
    Updated(RequestRow),
    /// The row already held the requested value; nothing was written.
    Unchanged(RequestRow),
    /// Tried to clear `accepted` on a row that is already accepted.
    AcceptedIsFinal,
    NotFound,
}

impl Database {
    // -- Requests --

    pub fn insert_request(&self, new: &NewRequestRow<'_>) -> Result<RequestRow> {
        let now = now_timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO valentine_requests
                    (id, sender_name, recipient_name, message, custom_message,
                     gift, theme, music, accepted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                rusqlite::params![
                    new.id,
                    new.sender_name,
                    new.recipient_name,
                    new.message,
                    new.custom_message,
                    new.gift,
                    new.theme,
                    new.music,
                    new.accepted,
                    now,
                ],
            )?;

            query_request(conn, new.id)?
                .ok_or_else(|| anyhow::anyhow!("Inserted request {} vanished", new.id))
        })
    }

    pub fn get_request(&self, id: &str) -> Result<Option<RequestRow>> {
        self.with_conn(|conn| query_request(conn, id))
    }

    /// Write the `accepted` flag. The flag only ever moves false -> true.
    pub fn set_accepted(&self, id: &str, accepted: bool) -> Result<UpdateOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(current) = query_request(&tx, id)? else {
                return Ok(UpdateOutcome::NotFound);
            };

            if current.accepted == accepted {
                return Ok(UpdateOutcome::Unchanged(current));
            }
            if current.accepted && !accepted {
                return Ok(UpdateOutcome::AcceptedIsFinal);
            }

            tx.execute(
                "UPDATE valentine_requests SET accepted = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![accepted, now_timestamp(), id],
            )?;
            let updated = query_request(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Updated request {} vanished", id))?;
            tx.commit()?;

            Ok(UpdateOutcome::Updated(updated))
        })
    }

    pub fn count_requests(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM valentine_requests", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_request(conn: &Connection, id: &str) -> Result<Option<RequestRow>> {
    let sql = format!("SELECT {} FROM valentine_requests WHERE id = ?1", REQUEST_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([id], map_request).optional()?;

    Ok(row)
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        sender_name: row.get(1)?,
        recipient_name: row.get(2)?,
        message: row.get(3)?,
        custom_message: row.get(4)?,
        gift: row.get(5)?,
        theme: row.get(6)?,
        music: row.get(7)?,
        accepted: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
