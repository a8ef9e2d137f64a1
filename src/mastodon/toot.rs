use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Account;

/// A timestamp as sent by the server, kept verbatim next to its parsed value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    raw: String,
    parsed: DateTime<Utc>,
}

impl Timestamp {
    /// The upstream text, untouched.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> &DateTime<Utc> {
        &self.parsed
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            parsed: DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc),
            raw: raw.to_string(),
        })
    }
}

impl TryFrom<String> for Timestamp {
    type Error = chrono::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.raw
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Toot {
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_account_id: Option<String>,
    /// Untrusted HTML as delivered by the server.
    pub content: String,
    /// Reblog wrappers carry `null` here.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub uri: String,
    pub account: Account,
    #[serde(default)]
    pub reblog: Option<Box<Toot>>,
    #[serde(default)]
    pub media_attachments: Vec<MediaAttachment>,
}

impl Toot {
    pub fn permalink(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.uri)
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to_account_id.is_some()
    }

    /// Attachments that get drawn, in their original order. Images the
    /// server has no file for yet are skipped.
    pub fn images(&self) -> impl Iterator<Item = &MediaAttachment> {
        self.media_attachments
            .iter()
            .filter(|attachment| attachment.ty == MediaType::Image && !attachment.href().is_empty())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub ty: MediaType,
    /// `null` for remote media the server has not fetched yet.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub blurhash: Option<String>,
}

impl MediaAttachment {
    pub fn preview(&self) -> &str {
        self.preview_url
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or_default()
    }

    pub fn href(&self) -> &str {
        self.url
            .as_deref()
            .or(self.preview_url.as_deref())
            .unwrap_or_default()
    }

    pub fn alt(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Gifv,
    Video,
    Audio,
    #[serde(other)]
    Unknown,
}

/// Response of `/api/v1/statuses/:id/context`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StatusContext {
    #[serde(default)]
    pub ancestors: Vec<Toot>,
    #[serde(default)]
    pub descendants: Vec<Toot>,
}
