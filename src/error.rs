use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reference has no `@name` handle and no explicit account id was given.
    #[error("not a Mastodon reference: {0}")]
    MalformedReference(String),

    /// The account lookup failed or returned no usable id.
    #[error("could not resolve @{handle}")]
    UnresolvableHandle {
        handle: String,
        #[source]
        source: Box<Error>,
    },

    #[error("upstream request to {url} failed")]
    UpstreamError {
        url: String,
        #[source]
        source: UpstreamCause,
    },

    #[error("invalid date format options: {0}")]
    InvalidDateFormat(#[from] serde_json::Error),

    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamCause {
    #[error(transparent)]
    Transport(#[from] reqwest_middleware::Error),
    #[error("server responded with {0}")]
    Status(StatusCode),
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("response carried no account id")]
    MissingId,
}

impl Error {
    pub(crate) fn upstream(url: impl ToString, source: impl Into<UpstreamCause>) -> Self {
        Self::UpstreamError {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
