use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::db::Db;
use crate::error::{AppError, Result};

/// A free-form note field value: text or a number, stored as sent
///
/// Booleans, arrays and objects are not storable and fail to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// Rebuild a value from its SQLite `typeof()` and text rendering
    fn from_stored(kind: &str, text: Option<String>) -> Option<Scalar> {
        let text = text?;
        match kind {
            "integer" => Some(text.parse().map(Scalar::Integer).unwrap_or(Scalar::Text(text))),
            "real" => Some(
                text.parse::<f64>()
                    .map(Scalar::Real)
                    .unwrap_or(Scalar::Text(text)),
            ),
            "null" => None,
            _ => Some(Scalar::Text(text)),
        }
    }
}

fn bind_scalar<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Option<Scalar>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        None => query.bind(None::<String>),
        Some(Scalar::Integer(i)) => query.bind(*i),
        Some(Scalar::Real(f)) => query.bind(*f),
        Some(Scalar::Text(s)) => query.bind(s.clone()),
    }
}

/// Full note row, returned by `/note`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    /// Public short url, unique across all notes
    pub url: String,
    /// Unique per owner
    pub name: String,
    pub user_id: i64,
    pub content: Option<Scalar>,
    pub misc: Option<Scalar>,
}

/// Note listing entry, content intentionally left out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub user_id: i64,
    pub misc: Option<Scalar>,
}

/// Raw row: untyped columns come back as `typeof()` + text
#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: i64,
    url: String,
    name: String,
    user_id: i64,
    content_type: String,
    content_text: Option<String>,
    misc_type: String,
    misc_text: Option<String>,
}

const SELECT_NOTE: &str = "SELECT id, url, name, user_id,
        typeof(content) AS content_type, CAST(content AS TEXT) AS content_text,
        typeof(misc) AS misc_type, CAST(misc AS TEXT) AS misc_text
    FROM notes";

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            name: row.name,
            user_id: row.user_id,
            content: Scalar::from_stored(&row.content_type, row.content_text),
            misc: Scalar::from_stored(&row.misc_type, row.misc_text),
        }
    }
}

impl From<Note> for NoteSummary {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            url: note.url,
            name: note.name,
            user_id: note.user_id,
            misc: note.misc,
        }
    }
}

/// Field changes for an existing note
///
/// Each field is `None` when omitted, `Some(None)` to clear it and
/// `Some(Some(v))` to set it (the empty string and zero included).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteUpdate {
    pub content: Option<Option<Scalar>>,
    pub name: Option<String>,
    pub misc: Option<Option<Scalar>>,
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.name.is_none() && self.misc.is_none()
    }
}

/// Whether `err` is a UNIQUE violation involving `column` (e.g. `notes.url`)
fn unique_violation_on(err: &sqlx::Error, column: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.message().contains(column)
        }
        _ => false,
    }
}

impl Note {
    /// Insert an empty note (no content) and return its id
    ///
    /// A url clash surfaces as `ShortUrlCollision` so the caller can draw a
    /// new url; any other uniqueness clash is a duplicate name.
    pub async fn create(db: &Db, user_id: i64, name: &str, url: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO notes (name, url, user_id) VALUES (?, ?, ?)")
            .bind(name)
            .bind(url)
            .bind(user_id)
            .execute(db)
            .await
            .map_err(|e| {
                if unique_violation_on(&e, "notes.url") {
                    AppError::ShortUrlCollision
                } else if unique_violation_on(&e, "notes.name") {
                    AppError::NoteNameTaken
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(db: &Db, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query_as::<_, NoteRow>(&format!("{} WHERE id = ?", SELECT_NOTE))
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(row.map(Note::from))
    }

    /// All notes owned by `user_id`, oldest first
    pub async fn list_for_user(db: &Db, user_id: i64) -> Result<Vec<NoteSummary>> {
        let rows = sqlx::query_as::<_, NoteRow>(&format!(
            "{} WHERE user_id = ? ORDER BY id",
            SELECT_NOTE
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| NoteSummary::from(Note::from(row)))
            .collect())
    }

    /// Whether `user_id` already owns a note called `name`, ignoring `except_id`
    pub async fn name_taken(
        db: &Db,
        user_id: i64,
        name: &str,
        except_id: Option<i64>,
    ) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM notes WHERE user_id = ? AND name = ? AND id != ? LIMIT 1",
        )
        .bind(user_id)
        .bind(name)
        .bind(except_id.unwrap_or(-1))
        .fetch_optional(db)
        .await?;

        Ok(row.is_some())
    }

    /// Apply every present field of `update` to note `id` in one transaction
    ///
    /// Storage failures map to `UpdateFailed`, except a name collision which
    /// maps to `NoteNameTaken`.
    pub async fn apply_update(db: &Db, id: i64, update: &NoteUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let mut tx = db.begin().await.map_err(AppError::UpdateFailed)?;

        if let Some(content) = &update.content {
            bind_scalar(sqlx::query("UPDATE notes SET content = ? WHERE id = ?"), content)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(update_error)?;
        }

        if let Some(name) = &update.name {
            sqlx::query("UPDATE notes SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(update_error)?;
        }

        if let Some(misc) = &update.misc {
            bind_scalar(sqlx::query("UPDATE notes SET misc = ? WHERE id = ?"), misc)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(update_error)?;
        }

        tx.commit().await.map_err(AppError::UpdateFailed)?;

        Ok(())
    }
}

fn update_error(e: sqlx::Error) -> AppError {
    if unique_violation_on(&e, "notes.name") {
        AppError::NoteNameTaken
    } else {
        AppError::UpdateFailed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_update() {
        assert!(NoteUpdate::default().is_empty());

        let update = NoteUpdate {
            misc: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_summary_has_no_content() {
        let summary = NoteSummary {
            id: 1,
            url: "AbCdEfGhIj".to_string(),
            name: "N1".to_string(),
            user_id: 2,
            misc: None,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["url"], "AbCdEfGhIj");
        assert!(json["misc"].is_null());
    }

    #[test]
    fn test_scalar_accepts_text_and_numbers() {
        assert_eq!(
            serde_json::from_value::<Scalar>(json!(0)).unwrap(),
            Scalar::Integer(0)
        );
        assert_eq!(
            serde_json::from_value::<Scalar>(json!(2.5)).unwrap(),
            Scalar::Real(2.5)
        );
        assert_eq!(
            serde_json::from_value::<Scalar>(json!("")).unwrap(),
            Scalar::Text(String::new())
        );
        assert!(serde_json::from_value::<Scalar>(json!(true)).is_err());
        assert!(serde_json::from_value::<Scalar>(json!({ "a": 1 })).is_err());
    }

    #[test]
    fn test_scalar_serializes_as_plain_json() {
        assert_eq!(serde_json::to_value(Scalar::Integer(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(Scalar::Text("x".into())).unwrap(), json!("x"));
    }

    #[test]
    fn test_scalar_from_stored() {
        assert_eq!(
            Scalar::from_stored("integer", Some("0".into())),
            Some(Scalar::Integer(0))
        );
        assert_eq!(
            Scalar::from_stored("real", Some("1.5".into())),
            Some(Scalar::Real(1.5))
        );
        assert_eq!(
            Scalar::from_stored("text", Some("42".into())),
            Some(Scalar::Text("42".into()))
        );
        assert_eq!(Scalar::from_stored("null", None), None);
    }
}
