use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_ID_REQUIRED, MAX_SHORT_URL_ATTEMPTS, ERR_NAME_NOT_NULL, ERR_NAME_REQUIRED};
use crate::error::{AppError, Result};
use crate::extract::{CurrentUser, Payload};
use crate::models::{Note, NoteSummary, NoteUpdate, Scalar};
use crate::routes::users::MessageResponse;
use crate::routes::validation::{lenient_id, present, require, require_text};
use crate::shortcode::{generate_url, ShortUrlTable};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NoteIdRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateNoteResponse {
    pub id: i64,
    pub url: String,
}

/// Body of `/update_note`; omitted fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<Scalar>>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub misc: Option<Option<Scalar>>,
}

impl UpdateNoteRequest {
    fn into_update(self) -> Result<NoteUpdate> {
        let name = match self.name {
            None => None,
            Some(None) => return Err(AppError::InvalidInput(ERR_NAME_NOT_NULL.to_string())),
            Some(Some(name)) => Some(require_text(Some(name), ERR_NAME_REQUIRED)?),
        };

        Ok(NoteUpdate {
            content: self.content,
            name,
            misc: self.misc,
        })
    }
}

/// Load a note and check that `user_id` owns it
///
/// Existence is checked before ownership.
async fn owned_note(state: &AppState, id: i64, user_id: i64) -> Result<Note> {
    let note = Note::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NoteNotFound)?;

    if note.user_id != user_id {
        tracing::warn!("User {} denied access to note {}", user_id, id);
        return Err(AppError::NotYourNote);
    }

    Ok(note)
}

/// List the caller's notes without their content
///
/// GET /notes
pub async fn list_notes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<NoteSummary>>> {
    let notes = Note::list_for_user(&state.db, user.user_id).await?;
    Ok(Json(notes))
}

/// Fetch one note, content included
///
/// POST /note with `id`
pub async fn get_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Payload(payload): Payload<NoteIdRequest>,
) -> Result<Json<Note>> {
    let id = require(payload.id, ERR_ID_REQUIRED)?;
    let note = owned_note(&state, id, user.user_id).await?;
    Ok(Json(note))
}

/// Create an empty note with a fresh short url
///
/// POST /new_note with `name`. Names are unique per owner.
pub async fn create_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Payload(payload): Payload<CreateNoteRequest>,
) -> Result<Json<CreateNoteResponse>> {
    let name = require_text(payload.name, ERR_NAME_REQUIRED)?;

    if Note::name_taken(&state.db, user.user_id, &name, None).await? {
        return Err(AppError::NoteNameTaken);
    }

    // The url can still be claimed between the check and the insert
    for _ in 0..MAX_SHORT_URL_ATTEMPTS {
        let url = generate_url(&state.db, ShortUrlTable::Notes).await?;
        match Note::create(&state.db, user.user_id, &name, &url).await {
            Ok(id) => {
                tracing::info!("User {} created note {} ({})", user.user_id, id, url);
                return Ok(Json(CreateNoteResponse { id, url }));
            }
            Err(AppError::ShortUrlCollision) => {
                tracing::warn!("Short url {} taken at insert, retrying", url);
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::ShortUrlExhausted(MAX_SHORT_URL_ATTEMPTS))
}

/// Update any subset of a note's content, name and misc
///
/// POST /update_note with `id`. A field set to `""` is stored as empty,
/// `null` clears `content`/`misc`. All changes commit together.
pub async fn update_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Payload(payload): Payload<UpdateNoteRequest>,
) -> Result<Json<MessageResponse>> {
    let id = require(payload.id, ERR_ID_REQUIRED)?;
    let update = payload.into_update()?;

    owned_note(&state, id, user.user_id).await?;

    if let Some(name) = &update.name {
        if Note::name_taken(&state.db, user.user_id, name, Some(id)).await? {
            return Err(AppError::NoteNameTaken);
        }
    }

    Note::apply_update(&state.db, id, &update).await?;

    tracing::info!("User {} updated note {}", user.user_id, id);

    Ok(Json(MessageResponse {
        message: "Note updated",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> UpdateNoteRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_update_request_only_misc() {
        let update = parse(json!({ "id": 1, "misc": "pinned" }))
            .into_update()
            .unwrap();

        assert_eq!(update.misc, Some(Some(Scalar::Text("pinned".to_string()))));
        assert_eq!(update.content, None);
        assert_eq!(update.name, None);
    }

    #[test]
    fn test_update_request_empty_content_is_a_set() {
        let update = parse(json!({ "id": 1, "content": "" })).into_update().unwrap();
        assert_eq!(update.content, Some(Some(Scalar::Text(String::new()))));
    }

    #[test]
    fn test_update_request_keeps_numeric_misc() {
        let update = parse(json!({ "id": "4", "misc": 0 })).into_update().unwrap();
        assert_eq!(update.misc, Some(Some(Scalar::Integer(0))));
        assert_eq!(parse(json!({ "id": "4" })).id, Some(4));
    }

    #[test]
    fn test_update_request_rejects_structured_misc() {
        let result = serde_json::from_value::<UpdateNoteRequest>(json!({ "id": 1, "misc": [1] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_null_clears() {
        let update = parse(json!({ "id": 1, "content": null, "misc": null }))
            .into_update()
            .unwrap();
        assert_eq!(update.content, Some(None));
        assert_eq!(update.misc, Some(None));
    }

    #[test]
    fn test_update_request_rejects_null_or_blank_name() {
        assert!(parse(json!({ "id": 1, "name": null })).into_update().is_err());
        assert!(parse(json!({ "id": 1, "name": "" })).into_update().is_err());
    }
}
