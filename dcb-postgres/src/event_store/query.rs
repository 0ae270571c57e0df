//! SQL criteria builder
//!
//! Translates a `dcb_core::Query` (an OR of AND-conjunctions over event types
//! and tags) into a parameterized `WHERE` fragment over the `tags` column,
//! using array containment (`tags @> $n`) rather than per-identifier columns.
use dcb_core::Query;
use sqlx::{Postgres, QueryBuilder};

/// Appends the SQL fragment for `query` to `builder`, wrapped in parens.
///
/// `Query::all()` compiles to `TRUE`, `Query::never()` to `FALSE`; everything
/// else is an `OR` of per-item `AND`s, each bound with `push_bind` so no tag
/// value or event type ever reaches the query string unescaped.
pub fn push_criteria<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a Query) {
    if query.is_all() {
        builder.push("TRUE");
        return;
    }
    if query.is_never() {
        builder.push("FALSE");
        return;
    }

    builder.push("(");
    let mut items = query.items().iter().peekable();
    while let Some(item) = items.next() {
        builder.push("(");
        let mut wrote = false;

        if !item.event_types().is_empty() {
            let types: Vec<String> = item.event_types().iter().cloned().collect();
            builder.push("event_type = ANY(");
            builder.push_bind(types);
            builder.push(")");
            wrote = true;
        }

        if !item.tags().is_empty() {
            if wrote {
                builder.push(" AND ");
            }
            builder.push("tags @> ");
            builder.push_bind(item.tags().to_wire_array());
            wrote = true;
        }

        if !wrote {
            builder.push("TRUE");
        }
        builder.push(")");

        if items.peek().is_some() {
            builder.push(" OR ");
        }
    }
    builder.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcb_core::query::{query, QueryItem};
    use dcb_core::tags;

    fn sql(q: &Query) -> String {
        let mut builder = QueryBuilder::new("");
        push_criteria(&mut builder, q);
        builder.sql().to_string()
    }

    #[test]
    fn it_compiles_all_and_never() {
        assert_eq!(sql(&Query::all()), "TRUE");
        assert_eq!(sql(&Query::never()), "FALSE");
    }

    #[test]
    fn it_compiles_a_single_item_with_types_and_tags() {
        let q = query(["Transferred"], tags! { from: "1" });
        assert_eq!(sql(&q), "((event_type = ANY($1) AND tags @> $2))");
    }

    #[test]
    fn it_ors_across_items() {
        let q = Query::new(vec![
            QueryItem::new(["Transferred"], tags! { from: "1" }),
            QueryItem::new(["Transferred"], tags! { to: "1" }),
        ]);
        assert_eq!(
            sql(&q),
            "((event_type = ANY($1) AND tags @> $2) OR (event_type = ANY($3) AND tags @> $4))"
        );
    }

    #[test]
    fn it_compiles_a_tags_only_item() {
        let q = QueryItem::with_tags(tags! { wallet_id: "w1" });
        assert_eq!(sql(&Query::new(vec![q])), "((tags @> $1))");
    }
}
