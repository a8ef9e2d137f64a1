pub mod toot;

use serde::{Deserialize, Serialize};

pub use toot::{MediaAttachment, MediaType, StatusContext, Toot};

/// Author snapshot carried by every toot.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    pub avatar: String,
    pub url: String,
}

/// Response of `/api/v1/accounts/lookup`. Only the id is used.
#[derive(Deserialize, Debug, Clone)]
pub struct AccountLookup {
    #[serde(default)]
    pub id: Option<String>,
}
