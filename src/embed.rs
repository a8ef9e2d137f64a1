//! Entry points for host pages.
//!
//! A [`Marker`] describes one placeholder on a page: which feed or thread
//! to show and how. Loading it yields a [`Replacement`] which the caller
//! swaps in for the placeholder. Nothing here touches a page.

use chrono::Locale;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        mastodon::{FeedQuery, MastodonClient, ThreadQuery},
        ClientOptions,
    },
    config::date_format::{parse_locale, DateFormat},
    error::{Error, Result},
    render::{
        sanitize::{AmmoniaSanitizer, Sanitizer},
        template::SafeFragment,
        Renderer,
    },
};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    #[default]
    Feed,
    Thread,
}

/// Field names follow the `data-*` attributes of the embedding markup,
/// e.g. `data-toot-limit` becomes `tootLimit`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Profile URL for feeds, any URL on the server for threads.
    pub href: String,
    pub toot_account_id: Option<String>,
    pub toot_limit: Option<u32>,
    pub exclude_replies: bool,
    pub exclude_reblogs: bool,
    pub self_replies_only: bool,
    pub toot_id: Option<String>,
    pub exclude_post: bool,
    pub locale: Option<String>,
    /// JSON object of [`DateFormat`] options.
    pub date_format: Option<String>,
}

impl Marker {
    pub fn feed_query(&self) -> FeedQuery {
        FeedQuery {
            account_id: self.toot_account_id.clone(),
            limit: self.toot_limit,
            exclude_replies: self.exclude_replies,
            exclude_reblogs: self.exclude_reblogs,
            self_replies_only: self.self_replies_only,
        }
    }

    pub fn thread_query(&self) -> Result<ThreadQuery> {
        let post_id = self
            .toot_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MalformedReference(format!("{} (no toot id)", self.href)))?;
        Ok(ThreadQuery {
            post_id,
            exclude_replies: self.exclude_replies,
            exclude_post: self.exclude_post,
        })
    }
}

/// The rendered toots that take a marker's place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacement {
    pub list: SafeFragment,
    pub count: usize,
}

impl Replacement {
    pub fn to_html(&self) -> &str {
        self.list.as_str()
    }
}

pub struct Embedder<S = AmmoniaSanitizer> {
    client: MastodonClient,
    sanitizer: S,
    locale: Option<Locale>,
    date_format: Option<DateFormat>,
}

impl Embedder {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        Ok(Self::with_sanitizer(
            MastodonClient::new(options)?,
            AmmoniaSanitizer,
        ))
    }
}

impl<S: Sanitizer + Clone> Embedder<S> {
    pub fn with_sanitizer(client: MastodonClient, sanitizer: S) -> Self {
        Self {
            client,
            sanitizer,
            locale: None,
            date_format: None,
        }
    }

    /// Default locale for markers that name none.
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Default date format for markers that name none.
    pub fn date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = Some(date_format);
        self
    }

    /// Marker settings override the embedder's, which override the host's.
    fn renderer(&self, marker: &Marker) -> Result<Renderer<S>> {
        let mut renderer = Renderer::new(self.sanitizer.clone());
        if let Some(locale) = marker.locale.as_deref().map(parse_locale).transpose()?.or(self.locale) {
            renderer = renderer.locale(locale);
        }
        let date_format = match marker.date_format.as_deref() {
            Some(json) => Some(DateFormat::from_json(json)?),
            None => self.date_format,
        };
        if let Some(date_format) = date_format {
            renderer = renderer.date_format(date_format);
        }
        Ok(renderer)
    }

    pub async fn load(&self, marker: &Marker) -> Result<Replacement> {
        match marker.kind {
            MarkerKind::Feed => self.load_feed(marker).await,
            MarkerKind::Thread => self.load_thread(marker).await,
        }
    }

    pub async fn load_feed(&self, marker: &Marker) -> Result<Replacement> {
        let renderer = self.renderer(marker)?;
        let toots = self
            .client
            .resolve_and_fetch(&marker.href, &marker.feed_query())
            .await?;

        info!("Rendering {} toots for {}", toots.len(), marker.href);
        Ok(Replacement {
            list: renderer.render_list(&toots),
            count: toots.len(),
        })
    }

    pub async fn load_thread(&self, marker: &Marker) -> Result<Replacement> {
        let renderer = self.renderer(marker)?;
        let query = marker.thread_query()?;
        let toots = self.client.fetch_thread(&marker.href, &query).await?;

        info!("Rendering {} thread toots for {}", toots.len(), marker.href);
        Ok(Replacement {
            list: renderer.render_list(&toots),
            count: toots.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_reads_data_attribute_names() {
        let marker: Marker = serde_json::from_str(
            r#"{"href":"https://example.social/@alice","tootLimit":3,"excludeReplies":true,"selfRepliesOnly":true,"dateFormat":"{\"month\":\"long\"}"}"#,
        )
        .unwrap();
        assert_eq!(marker.kind, MarkerKind::Feed);
        assert_eq!(
            marker.feed_query(),
            FeedQuery {
                account_id: None,
                limit: Some(3),
                exclude_replies: true,
                exclude_reblogs: false,
                self_replies_only: true,
            }
        );
        assert_eq!(marker.date_format.as_deref(), Some(r#"{"month":"long"}"#));
    }

    #[test]
    fn thread_marker_needs_toot_id() {
        let marker = Marker {
            kind: MarkerKind::Thread,
            href: "https://example.social/@alice/1".to_string(),
            ..Default::default()
        };
        assert!(matches!(marker.thread_query(), Err(Error::MalformedReference(_))));

        let marker = Marker {
            toot_id: Some("1".to_string()),
            exclude_post: true,
            ..marker
        };
        let query = marker.thread_query().unwrap();
        assert_eq!(query.post_id, "1");
        assert!(query.exclude_post);
        assert!(!query.exclude_replies);
    }
}
