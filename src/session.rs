//! Session identifiers and their on-disk form.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomError};
use crate::schema::{Joined, Opened, RoomId, SessionId, UserId};

/// Identifiers a [`crate::RoomClient`] echoes back on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfigs {
    pub room_id: RoomId,
    pub session_id: SessionId,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl SessionConfigs {
    pub fn new(room_id: impl Into<RoomId>, session_id: impl Into<SessionId>) -> Self {
        Self { room_id: room_id.into(), session_id: session_id.into(), user_id: None }
    }

    pub(crate) fn joined(room_id: RoomId, joined: &Joined) -> Self {
        Self {
            room_id,
            session_id: joined.session_id.clone(),
            user_id: Some(joined.user_id.clone()),
        }
    }

    /// Value of the session header sent with every room-scoped request.
    #[must_use]
    pub fn cookie(&self) -> String {
        format!("session_id={}", self.session_id)
    }

    /// Write the session as pretty JSON, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::SessionIo`] if the file cannot be written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| RoomError::SessionIo { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), room_id = %self.room_id, "session saved");
        Ok(())
    }

    /// Read a session previously written by [`SessionConfigs::save`].
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::SessionIo`] if the file cannot be read and
    /// [`RoomError::InvalidJson`] if it does not hold a session.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RoomError::SessionIo { path: path.to_path_buf(), source })?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl From<Opened> for SessionConfigs {
    fn from(value: Opened) -> Self {
        Self { room_id: value.room_id, session_id: value.session_id, user_id: Some(value.user_id) }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
