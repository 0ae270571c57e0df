//! A processor's declarative event filter: compiles to a `Query` plus an
//! optional post-fetch predicate for criteria that don't reduce to a single
//! tag containment check (spec §3/§4.4).
use std::collections::{BTreeSet, HashMap};

use crate::event::Event;
use crate::query::{Query, QueryItem};
use crate::tags::TagSet;

/// A processor's subscription to a slice of the event log.
#[derive(Debug, Clone, Default)]
pub struct Subscription {
    /// Event types the processor cares about; empty means "any type".
    pub event_types: BTreeSet<String>,
    /// Tag keys that must be present (any value) on every matching event.
    pub required_tags: BTreeSet<String>,
    /// Tag keys where at least one of the named values must be present.
    pub any_of_tags: HashMap<String, BTreeSet<String>>,
    /// Tag keys that must carry exactly the named value.
    pub exact_tags: HashMap<String, String>,
    /// Handler publisher names this subscription is restricted to, if any.
    pub publishers: BTreeSet<String>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.event_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_required_tag(mut self, key: impl Into<String>) -> Self {
        self.required_tags.insert(key.into());
        self
    }

    pub fn with_any_of_tag(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.any_of_tags
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exact_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.exact_tags.insert(key.into(), value.into());
        self
    }

    /// Compiles this subscription into the `Query` sent to the store.
    ///
    /// Only `event_types` and `exact_tags` narrow the SQL-level containment
    /// check, since `required_tags` asks only for presence (any value) and
    /// `any_of_tags` is an OR over specific values — both are applied as a
    /// post-filter in `matches_post_filter` once the store has returned its
    /// (necessarily broader) candidate set.
    pub fn compile(&self) -> Query {
        let exact = self
            .exact_tags
            .iter()
            .fold(TagSet::new(), |set, (k, v)| set.with(k.clone(), v.clone()));
        Query::new(vec![QueryItem::new(self.event_types.clone(), exact)])
    }

    /// True iff `event` satisfies the `required_tags`/`any_of_tags` criteria
    /// the compiled `Query` could not express.
    pub fn matches_post_filter<E: Event>(&self, event: &E) -> bool {
        let tags = event.tags();
        let present_keys: BTreeSet<&str> = tags.iter().map(|t| t.key.as_str()).collect();

        let required_ok = self
            .required_tags
            .iter()
            .all(|key| present_keys.contains(key.as_str()));

        let any_of_ok = self.any_of_tags.iter().all(|(key, values)| {
            tags.iter()
                .any(|t| t.key == *key && values.contains(&t.value))
        });

        required_ok && any_of_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    struct Transferred;

    impl Event for Transferred {
        fn event_type(&self) -> &'static str {
            "Transferred"
        }
        fn tags(&self) -> TagSet {
            tags! { from: "w1", to: "w2", currency: "EUR" }
        }
    }

    #[test]
    fn it_compiles_event_types_and_exact_tags_into_the_query() {
        let sub = Subscription::new()
            .with_event_types(["Transferred"])
            .with_exact_tag("currency", "EUR");
        let query = sub.compile();
        assert!(query.matches("Transferred", &tags! { currency: "EUR" }));
        assert!(!query.matches("Transferred", &tags! { currency: "USD" }));
    }

    #[test]
    fn it_post_filters_required_and_any_of_tags() {
        let sub = Subscription::new()
            .with_required_tag("from")
            .with_any_of_tag("to", ["w2", "w3"]);
        assert!(sub.matches_post_filter(&Transferred));

        let sub_excluding = Subscription::new().with_any_of_tag("to", ["w9"]);
        assert!(!sub_excluding.matches_post_filter(&Transferred));
    }
}
