//! The query model: an OR of `QueryItem`s, each an AND of an event-type set
//! and a tag-equality set.
//!
//! This is the structured filter described in spec §3: `Query = list<QueryItem>`,
//! `QueryItem = (eventTypes: set<string>, tags: set<(key,value)>)`. An event
//! matches a `QueryItem` iff `eventTypes` is empty or contains the event's
//! type, and every tag in the item's tag set is present on the event. An
//! event matches a `Query` iff it matches at least one item.
use crate::event::Event;
use crate::tags::TagSet;
use std::collections::BTreeSet;

/// One AND-conjunction of event types and required tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem {
    event_types: BTreeSet<String>,
    tags: TagSet,
}

impl QueryItem {
    pub fn new(event_types: impl IntoIterator<Item = impl Into<String>>, tags: TagSet) -> Self {
        Self {
            event_types: event_types.into_iter().map(Into::into).collect(),
            tags,
        }
    }

    /// A query item that matches events of the given type(s) regardless of tags.
    pub fn of_types(event_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(event_types, TagSet::new())
    }

    /// A query item that matches any event type carrying the given tags.
    pub fn with_tags(tags: TagSet) -> Self {
        Self::new(Vec::<String>::new(), tags)
    }

    pub fn event_types(&self) -> &BTreeSet<String> {
        &self.event_types
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn matches(&self, event_type: &str, event_tags: &TagSet) -> bool {
        (self.event_types.is_empty() || self.event_types.contains(event_type))
            && event_tags.contains_all(&self.tags)
    }
}

/// A structured OR-of-AND filter over the event log.
///
/// An empty query (no items) matches **all** events when used to fetch, and
/// matches **no** events when used as a concurrency guard — callers must pick
/// the right constructor (`Query::all()` vs `Query::never()`) for their
/// intent, since the empty-item-list representation is shared but the
/// matching semantics differ by use site (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    items: Vec<QueryItem>,
    /// Distinguishes "matches everything" (fetch default) from "matches
    /// nothing" (guard default) when `items` is empty.
    match_all_when_empty: bool,
}

impl Query {
    pub fn new(items: Vec<QueryItem>) -> Self {
        Self {
            items,
            match_all_when_empty: false,
        }
    }

    /// An empty query used for fetching: matches every event.
    pub fn all() -> Self {
        Self {
            items: Vec::new(),
            match_all_when_empty: true,
        }
    }

    /// An empty query used as an append guard: matches no event, i.e. the
    /// guard always trivially succeeds.
    pub fn never() -> Self {
        Self {
            items: Vec::new(),
            match_all_when_empty: false,
        }
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True for the canonical "matches everything" query (`Query::all()`).
    pub fn is_all(&self) -> bool {
        self.items.is_empty() && self.match_all_when_empty
    }

    /// True for the canonical "matches nothing" query (`Query::never()`).
    pub fn is_never(&self) -> bool {
        self.items.is_empty() && !self.match_all_when_empty
    }

    pub fn matches(&self, event_type: &str, event_tags: &TagSet) -> bool {
        if self.items.is_empty() {
            return self.match_all_when_empty;
        }
        self.items.iter().any(|item| item.matches(event_type, event_tags))
    }

    pub fn matches_event<E: Event>(&self, event: &E) -> bool {
        self.matches(event.event_type(), &event.tags())
    }
}

/// Builds a single-item query for one event type set and tag set; convenience
/// for the common case of a decision model reading one stream.
pub fn query(
    event_types: impl IntoIterator<Item = impl Into<String>>,
    tags: TagSet,
) -> Query {
    Query::new(vec![QueryItem::new(event_types, tags)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    #[test]
    fn it_matches_on_type_and_tags() {
        let item = QueryItem::new(["Transferred"], tags! { from: "1" });
        assert!(item.matches("Transferred", &tags! { from: "1", to: "2" }));
        assert!(!item.matches("Transferred", &tags! { from: "2" }));
        assert!(!item.matches("Opened", &tags! { from: "1" }));
    }

    #[test]
    fn it_matches_any_type_when_types_empty() {
        let item = QueryItem::with_tags(tags! { wallet_id: "w1" });
        assert!(item.matches("Anything", &tags! { wallet_id: "w1" }));
    }

    #[test]
    fn it_ors_across_items() {
        // S2 from spec §8: Query = [{Transferred, from=1}, {Transferred, to=1}]
        let q = Query::new(vec![
            QueryItem::new(["Transferred"], tags! { from: "1" }),
            QueryItem::new(["Transferred"], tags! { to: "1" }),
        ]);
        assert!(q.matches("Transferred", &tags! { from: "1", to: "2" }));
        assert!(q.matches("Transferred", &tags! { from: "3", to: "1" }));
        assert!(!q.matches("Transferred", &tags! { from: "3", to: "2" }));
        assert!(!q.matches("Opened", &tags! { wallet_id: "3" }));
    }

    #[test]
    fn empty_query_matches_all_for_fetch_and_none_for_guard() {
        assert!(Query::all().matches("Anything", &TagSet::new()));
        assert!(!Query::never().matches("Anything", &TagSet::new()));
    }
}
