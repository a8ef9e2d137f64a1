use std::collections::HashSet;

/// Turns untrusted markup into markup that can be injected verbatim.
pub trait Sanitizer: Send + Sync {
    fn clean(&self, untrusted: &str) -> String;
}

/// [`ammonia`] with the microformat classes Mastodon puts on mentions,
/// hashtags and shortened links.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaSanitizer;

impl Sanitizer for AmmoniaSanitizer {
    fn clean(&self, untrusted: &str) -> String {
        let mut builder = ammonia::Builder::default();
        builder
            .add_allowed_classes("a", &["mention", "hashtag", "u-url"])
            .add_allowed_classes("span", &["h-card", "invisible", "ellipsis"])
            .link_rel(Some("nofollow noopener noreferrer"))
            .url_schemes(HashSet::from(["http", "https", "mailto"]));
        builder.clean(untrusted).to_string()
    }
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn clean(&self, untrusted: &str) -> String {
        self(untrusted)
    }
}
