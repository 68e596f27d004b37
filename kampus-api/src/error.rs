use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Viewer is not authenticated")]
    Unauthenticated,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Unknown entity {0}")]
    UnknownEntity(Uuid),

    #[error("Vote already recorded for entity {0}")]
    VoteAlreadyRecorded(Uuid),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::UnknownEntity(_) => StatusCode::NOT_FOUND,
            Error::VoteAlreadyRecorded(_) => StatusCode::CONFLICT,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::Unauthenticated => json!({
                "message": "viewer is not authenticated",
                "type": "unauthenticated",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::UnknownEntity(u) => json!({
                "message": "unknown entity",
                "type": "unknown-entity",
                "uuid": u,
            }),
            Error::VoteAlreadyRecorded(u) => json!({
                "message": "vote already recorded",
                "type": "conflict-vote",
                "uuid": u,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let uuid_field = || {
            data.get("uuid")
                .and_then(|uuid| uuid.as_str())
                .and_then(|uuid| Uuid::from_str(uuid).ok())
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "unauthenticated" => Error::Unauthenticated,
                "permission-denied" => Error::PermissionDenied,
                "unknown-entity" => Error::UnknownEntity(
                    uuid_field()
                        .ok_or_else(|| anyhow!("unknown-entity error without a proper uuid"))?,
                ),
                "conflict-vote" => Error::VoteAlreadyRecorded(
                    uuid_field()
                        .ok_or_else(|| anyhow!("vote conflict error without a proper uuid"))?,
                ),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
