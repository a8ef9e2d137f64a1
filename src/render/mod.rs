pub mod sanitize;
pub mod template;

use chrono::Locale;

use crate::{
    config::date_format::{host_locale, DateFormat},
    html,
    mastodon::{Account, MediaAttachment, Toot},
};
use sanitize::{AmmoniaSanitizer, Sanitizer};
use template::{mark_safe, SafeFragment};

/// Turns toots into `<li class="toot">` fragments.
pub struct Renderer<S = AmmoniaSanitizer> {
    sanitizer: S,
    locale: Locale,
    date_format: DateFormat,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(AmmoniaSanitizer)
    }
}

impl<S: Sanitizer> Renderer<S> {
    pub fn new(sanitizer: S) -> Self {
        Self {
            sanitizer,
            locale: host_locale(),
            date_format: DateFormat::default(),
        }
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// Render a single toot. A reblog shows the reblogged toot with the
    /// reblogging account as a badge above its author.
    pub fn render_toot(&self, toot: &Toot) -> String {
        let (toot, booster) = match toot.reblog.as_deref() {
            Some(inner) => (inner, Some(&toot.account)),
            None => (toot, None),
        };

        let date = self.date_format.format(toot.created_at.parsed(), self.locale);
        let boost = booster.map(|account| account_link(account, "user boost", 23));
        let images: Vec<SafeFragment> = toot.images().map(attachment).collect();

        // The sanitizer output is the only unescaped upstream text.
        let body = mark_safe(self.sanitizer.clean(&toot.content));

        html!(
            r#"<li class="toot">
  <a class="permalink" href="{}"><time datetime="{}">{}</time></a>
  {}{}
  <div class="body">{}</div>
  {}
</li>"#,
            toot.permalink(),
            toot.created_at.raw(),
            date,
            boost,
            account_link(&toot.account, "user", 46),
            body,
            images,
        )
        .into_string()
    }

    /// Render toots as the `<ol class="toots">` list that replaces a marker.
    pub fn render_list(&self, toots: &[Toot]) -> SafeFragment {
        let items: Vec<SafeFragment> = toots
            .iter()
            .map(|toot| mark_safe(self.render_toot(toot)))
            .collect();
        html!("<ol class=\"toots\">\n{}</ol>\n", items)
    }
}

fn account_link(account: &Account, class: &str, size: u32) -> SafeFragment {
    let size = size.to_string();
    html!(
        r#"<a class="{}" href="{}"><img class="avatar" width="{}" height="{}" src="{}" alt=""><span class="display-name">{}</span> <span class="username">@{}</span></a>"#,
        class,
        &account.url,
        &size,
        &size,
        &account.avatar,
        &account.display_name,
        &account.username,
    )
}

fn attachment(media: &MediaAttachment) -> SafeFragment {
    html!(
        r#"<a class="attachment" href="{}" target="_blank" rel="noopener noreferrer"><img class="attachment" src="{}" alt="{}"></a>"#,
        media.href(),
        media.preview(),
        media.alt(),
    )
}
