use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` the same as a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_default")]
    pub acct: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub note: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub followers_count: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub following_count: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub statuses_count: u64,
}

impl Account {
    /// Display name, falling back to the username when unset or empty.
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_default")]
    pub acct: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gifv,
    Audio,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub account: Account,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_default")]
    pub spoiler_text: String,
    #[serde(default, deserialize_with = "null_default")]
    pub sensitive: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub favourited: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub reblogged: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub pinned: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub favourites_count: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub reblogs_count: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub replies_count: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub media_attachments: Vec<Attachment>,
    #[serde(default, deserialize_with = "null_default")]
    pub mentions: Vec<Mention>,
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_account_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Mention,
    Reblog,
    Favourite,
    Follow,
    Pinned,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The two shapes a toot box can be fed. The API layer decides which one it
/// is building; nothing downstream inspects the JSON to find out.
#[derive(Debug, Clone, PartialEq)]
pub enum TootPayload {
    Status(Status),
    Notification(Notification),
}

impl TootPayload {
    /// Status shown in the body: the inner status of a notification, the
    /// reblogged status of a boost, otherwise the status itself.
    pub fn display_status(&self) -> Option<&Status> {
        match self {
            TootPayload::Notification(n) => n.status.as_ref(),
            TootPayload::Status(s) => Some(s.reblog.as_deref().unwrap_or(s)),
        }
    }

    pub fn display_status_mut(&mut self) -> Option<&mut Status> {
        match self {
            TootPayload::Notification(n) => n.status.as_mut(),
            TootPayload::Status(s) => {
                if s.reblog.is_some() {
                    s.reblog.as_deref_mut()
                } else {
                    Some(s)
                }
            }
        }
    }

    /// Identifier of the payload itself (notification id or outer status id).
    pub fn key(&self) -> &str {
        match self {
            TootPayload::Notification(n) => &n.id,
            TootPayload::Status(s) => &s.id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomEmoji {
    pub shortcode: String,
    pub url: String,
    #[serde(default)]
    pub static_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub ancestors: Vec<Status>,
    #[serde(default)]
    pub descendants: Vec<Status>,
}
