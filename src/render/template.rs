//! A very small templating system.
//!
//! Literal template text is trusted. Every substituted value is escaped
//! unless it is already a [`SafeFragment`], so composed fragments can be
//! nested without being escaped twice.

use std::fmt;

/// Markup that must not be escaped again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeFragment(String);

impl SafeFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mark text as safe for inclusion in HTML.
///
/// Only for output of a [`Sanitizer`](super::sanitize::Sanitizer). Never call
/// this on data taken straight from an upstream response.
pub fn mark_safe(text: impl Into<String>) -> SafeFragment {
    SafeFragment(text.into())
}

/// A substitution value.
///
/// `Empty` renders as nothing, which makes `Option<SafeFragment>` usable for
/// conditional sections. `List` is flattened with no separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Safe(SafeFragment),
    List(Vec<Value>),
    Empty,
}

impl Value {
    fn flatten_into(self, out: &mut String) {
        match self {
            Value::Text(text) => escape_into(&text, out),
            Value::Safe(fragment) => out.push_str(fragment.as_str()),
            Value::List(values) => values.into_iter().for_each(|v| v.flatten_into(out)),
            Value::Empty => {}
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&String> for Value {
    fn from(text: &String) -> Self {
        Value::Text(text.clone())
    }
}

impl From<SafeFragment> for Value {
    fn from(fragment: SafeFragment) -> Self {
        Value::Safe(fragment)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Empty, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// Interleave literal parts with values: `parts[0] v[0] parts[1] v[1] ... parts[n]`.
///
/// Missing values render as empty, surplus values are dropped.
pub fn compose<S: AsRef<str>>(parts: &[S], values: Vec<Value>) -> SafeFragment {
    let mut out = String::new();
    let mut values = values.into_iter();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            values.next().unwrap_or(Value::Empty).flatten_into(&mut out);
        }
        out.push_str(part.as_ref());
    }
    SafeFragment(out)
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
}

/// Compose a [`SafeFragment`] from a literal with `{}` holes.
///
/// ```
/// use toot_embed::html;
///
/// let link = html!(r#"<a href="{}">{}</a>"#, "/?a=1&b=2", "<me>");
/// assert_eq!(link.as_str(), r#"<a href="/?a=1&amp;b=2">&lt;me&gt;</a>"#);
/// ```
#[macro_export]
macro_rules! html {
    ($template:expr $(, $value:expr)* $(,)?) => {
        $crate::render::template::compose(
            &$template.split("{}").collect::<::std::vec::Vec<&str>>(),
            ::std::vec![$($crate::render::template::Value::from($value)),*],
        )
    };
}
