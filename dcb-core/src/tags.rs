//! Tags are `(key, value)` string pairs attached to an event.
//!
//! Unlike the single-valued domain identifiers of a classic aggregate model, a
//! tag key may repeat within one event with different values (e.g. a transfer
//! event tagging both `from_wallet_id` and `to_wallet_id` under different
//! keys, or in principle the same key twice). Order is insertion order but
//! carries no semantic meaning; equality and containment are set-based.
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A single `key=value` tag attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// Returns the `"key=value"` wire representation stored in the `tags` column.
    pub fn to_wire(&self) -> String {
        format!("{}={}", self.key, self.value)
    }

    /// Parses a `"key=value"` wire representation back into a `Tag`.
    ///
    /// Splits on the first `=` only, so values are free to contain `=`.
    pub fn from_wire(s: &str) -> Option<Self> {
        let (key, value) = s.split_once('=')?;
        Some(Tag::new(key, value))
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

/// A set of tags, in insertion order, with set (not positional) equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_iter(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self(tags.into_iter().collect())
    }

    pub fn insert(&mut self, tag: Tag) {
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(Tag::new(key, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// True iff every tag in `required` is present in `self`.
    ///
    /// This is the containment check used both by the fetch query (a
    /// `QueryItem`'s tag conjunction) and by the append guard.
    pub fn contains_all(&self, required: &TagSet) -> bool {
        required.0.iter().all(|t| self.0.contains(t))
    }

    pub fn to_wire_array(&self) -> Vec<String> {
        self.0.iter().map(Tag::to_wire).collect()
    }

    pub fn from_wire_array(tags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self(
            tags.into_iter()
                .filter_map(|s| Tag::from_wire(s.as_ref()))
                .collect(),
        )
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|t| other.0.contains(t))
    }
}
impl Eq for TagSet {}

impl FromIterator<Tag> for TagSet {
    fn from_iter<T: IntoIterator<Item = Tag>>(iter: T) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Creates a `TagSet` from `key: value` pairs.
///
/// ```
/// use dcb_core::tags;
///
/// let tags = tags! { wallet_id: "w1", currency: "EUR" };
/// assert_eq!(tags.iter().count(), 2);
/// ```
#[macro_export]
macro_rules! tags {
    {} => { $crate::tags::TagSet::new() };
    {$($key:ident: $value:expr),* $(,)?} => {{
        #[allow(unused_mut)]
        let mut set = $crate::tags::TagSet::new();
        $(set.insert($crate::tags::Tag::new(stringify!($key), $value));)*
        set
    }};
}

/// Validates that a string is a well-formed tag key or event type name.
///
/// Mirrors the identifier validation the teacher applies to domain
/// identifiers, relaxed to allow the dotted/namespaced type names common in
/// this domain (e.g. `"wallet.Opened"`).
pub fn is_valid_name(s: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new("^[a-zA-Z_][a-zA-Z0-9_.]*$").unwrap();
    }
    RE.is_match(s)
}
