use std::sync::LazyLock;

use futures::future::{self, Either};
use log::{debug, info};
use regex::Regex;
use url::Url;

use super::{ApiClient, ClientOptions};
use crate::{
    error::{Error, Result, UpstreamCause},
    mastodon::{AccountLookup, StatusContext, Toot},
};

pub const DEFAULT_LIMIT: u32 = 5;

/// Trailing `@name` of a profile URL path.
static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)$").expect("handle regex should compile"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    /// Skips the handle lookup when set.
    pub account_id: Option<String>,
    /// At most this many recent toots, [`DEFAULT_LIMIT`] if unset.
    pub limit: Option<u32>,
    pub exclude_replies: bool,
    pub exclude_reblogs: bool,
    /// Drops every toot with a reply target after fetching. Despite the
    /// name this removes replies to oneself too, not only replies to others.
    pub self_replies_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadQuery {
    pub post_id: String,
    pub exclude_replies: bool,
    pub exclude_post: bool,
}

#[derive(Debug, Clone)]
pub struct MastodonClient {
    inner: ApiClient,
}

impl MastodonClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            inner: ApiClient::new(options)?,
        })
    }

    /// The `name` in `https://host/@name`.
    pub fn handle(profile_url: &Url) -> Option<&str> {
        HANDLE
            .captures(profile_url.path())
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    /// Same origin as `base` with a new path and no query.
    fn endpoint(base: &Url, path: &str) -> Url {
        let mut url = base.clone();
        url.set_path(path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    fn parse(reference: &str) -> Result<Url> {
        Url::parse(reference).map_err(|_| Error::MalformedReference(reference.to_string()))
    }

    /// Look up the account id behind a profile URL.
    pub async fn resolve_account(&self, profile_url: &str) -> Result<String> {
        let url = Self::parse(profile_url)?;
        let handle = Self::handle(&url)
            .ok_or_else(|| Error::MalformedReference(profile_url.to_string()))?;
        self.lookup(&url, handle).await
    }

    async fn lookup(&self, base: &Url, handle: &str) -> Result<String> {
        let mut url = Self::endpoint(base, "/api/v1/accounts/lookup");
        url.query_pairs_mut().append_pair("acct", handle);

        let unresolvable = |source| Error::UnresolvableHandle {
            handle: handle.to_string(),
            source: Box::new(source),
        };
        let lookup: AccountLookup = self.inner.get_json(url.clone()).await.map_err(unresolvable)?;
        match lookup.id {
            Some(id) if !id.is_empty() => {
                debug!("@{} is account {}", handle, id);
                Ok(id)
            }
            _ => Err(unresolvable(Error::upstream(&url, UpstreamCause::MissingId))),
        }
    }

    /// Fetch the most recent toots of the account behind `profile_url`.
    pub async fn resolve_and_fetch(&self, profile_url: &str, query: &FeedQuery) -> Result<Vec<Toot>> {
        let url = Self::parse(profile_url)?;
        let account_id = match &query.account_id {
            Some(id) => id.clone(),
            None => {
                let handle = Self::handle(&url)
                    .ok_or_else(|| Error::MalformedReference(profile_url.to_string()))?;
                self.lookup(&url, handle).await?
            }
        };

        let mut statuses =
            Self::endpoint(&url, &format!("/api/v1/accounts/{account_id}/statuses"));
        statuses
            .query_pairs_mut()
            .append_pair("limit", &query.limit.unwrap_or(DEFAULT_LIMIT).to_string())
            .append_pair("exclude_replies", &query.exclude_replies.to_string())
            .append_pair("exclude_reblogs", &query.exclude_reblogs.to_string());

        let mut toots: Vec<Toot> = self.inner.get_json(statuses).await?;
        if query.self_replies_only {
            toots.retain(|toot| !toot.is_reply());
        }

        info!("{} toots from account {}", toots.len(), account_id);
        Ok(toots)
    }

    /// Fetch a toot followed by its replies.
    pub async fn fetch_thread(&self, post_url: &str, query: &ThreadQuery) -> Result<Vec<Toot>> {
        let url = Self::parse(post_url)?;
        let id = &query.post_id;

        let post = if query.exclude_post {
            Either::Left(future::ok::<_, Error>(None))
        } else {
            let status = Self::endpoint(&url, &format!("/api/v1/statuses/{id}"));
            Either::Right(async move { self.inner.get_json::<Toot>(status).await.map(Some) })
        };
        let replies = if query.exclude_replies {
            Either::Left(future::ok::<_, Error>(StatusContext::default()))
        } else {
            let context = Self::endpoint(&url, &format!("/api/v1/statuses/{id}/context"));
            Either::Right(self.inner.get_json::<StatusContext>(context))
        };

        let (post, context) = future::try_join(post, replies).await?;

        let mut toots: Vec<Toot> = post.into_iter().collect();
        toots.extend(context.descendants);

        info!("{} toots in thread {}", toots.len(), id);
        Ok(toots)
    }
}
