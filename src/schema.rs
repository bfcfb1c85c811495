//! Request and response bodies exchanged with the room server.
//!
//! The server owns the schema; these shapes mirror it on a best-effort basis.
//! Anything a caller does not want to commit to can be read as
//! `serde_json::Value` instead.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id!(
    /// Server-assigned room identifier.
    RoomId
);
string_id!(
    /// Server-issued credential authorizing calls against one room.
    SessionId
);
string_id!(UserId);
string_id!(DiscussionId);
string_id!(MessageId);

// =============================================================================
// ROOM
// =============================================================================

/// Body of `POST /room/open`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    /// Requested room lifetime. The server clamps it to its own limit.
    pub lifetime_secs: Option<u64>,
    /// Requested capacity. The server clamps it to its own limit.
    pub user_limits: Option<u64>,
    /// Initial repository bundle, passed through opaquely.
    pub bundle: Option<Value>,
}

/// Success body of `POST /room/open`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opened {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub session_id: SessionId,
    #[serde(default)]
    pub capacity: Option<u64>,
}

/// Body of `POST /room/{room_id}/join`. `None` lets the server pick a user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joined {
    pub user_id: UserId,
    pub session_id: SessionId,
    #[serde(default)]
    pub bundle: Value,
    #[serde(default)]
    pub discussions: Value,
}

// =============================================================================
// DISCUSSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Create {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionMeta {
    pub id: DiscussionId,
    pub creator: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub meta: DiscussionMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speak {
    pub discussion_id: DiscussionId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spoke {
    pub discussion_id: DiscussionId,
    pub message: Message,
}

/// Reply to message `to` inside discussion `discussion_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub discussion_id: DiscussionId,
    pub to: MessageId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replied {
    pub discussion_id: DiscussionId,
    pub to: MessageId,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    pub discussion_id: DiscussionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closed {
    pub discussion_id: DiscussionId,
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
