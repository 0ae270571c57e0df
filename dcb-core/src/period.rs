//! Lazily opens/closes time-bucketed "period" events so per-key projections
//! stay bounded (spec C13, sketch-level by design).
use chrono::{DateTime, Datelike, Utc};

use crate::event::{Cursor, Event};
use crate::event_store::{AppendCondition, EventStore};
use crate::query::Query;

/// The granularity a period resolver buckets time into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
}

/// Formats the period id for `key` at `at`, e.g. `"wallet:w1:2025-01"` for a
/// monthly period.
pub fn period_id(key: &str, period_type: PeriodType, at: DateTime<Utc>) -> String {
    match period_type {
        PeriodType::Daily => format!("{key}:{}", at.format("%Y-%m-%d")),
        PeriodType::Weekly => format!("{key}:{}-W{:02}", at.iso_week().year(), at.iso_week().week()),
        PeriodType::Monthly => format!("{key}:{}", at.format("%Y-%m")),
    }
}

/// Formats the period id immediately preceding `at`'s period.
pub fn previous_period_id(key: &str, period_type: PeriodType, at: DateTime<Utc>) -> String {
    let prev = match period_type {
        PeriodType::Daily => at - chrono::Duration::days(1),
        PeriodType::Weekly => at - chrono::Duration::weeks(1),
        PeriodType::Monthly => {
            let (year, month) = if at.month() == 1 {
                (at.year() - 1, 12)
            } else {
                (at.year(), at.month() - 1)
            };
            at.with_year(year)
                .and_then(|d| d.with_month(month))
                .unwrap_or(at)
        }
    };
    period_id(key, period_type, prev)
}

/// Bridges the generic period-resolution algorithm to a concrete event
/// family: how to query/build the `PeriodOpened`/`PeriodClosed` events and
/// how to fold a balance out of the previous period's slice.
pub trait PeriodLedger<E: Event>: Send + Sync {
    /// A guard query matching an already-present `PeriodOpened`/`PeriodClosed`
    /// event for `period_id`, used both to short-circuit and as the
    /// idempotency guard on append.
    fn period_marker_query(&self, event_type: &'static str, period_id: &str) -> Query;

    /// The query for the previous period's full event slice, to fold a
    /// closing balance from.
    fn period_slice_query(&self, period_id: &str) -> Query;

    /// Folds one event of the previous period's slice into the running
    /// balance.
    fn fold_balance(&self, balance: &mut i64, event: &E);

    fn make_period_closed(&self, period_id: &str, closing_balance: i64) -> E;
    fn make_period_opened(&self, period_id: &str, opening_balance: i64) -> E;
}

/// Ensures the period for `key` at `now` is open, closing the previous one
/// first if needed, and returns the current period id.
///
/// Idempotent: if two command handlers race to open the same period, the
/// loser's guarded append fails with `StoreError::ConcurrencyConflict`, which
/// this function swallows as success (the winner already opened it).
pub async fn resolve_active_period<ES, E, L>(
    store: &ES,
    ledger: &L,
    key: &str,
    period_type: PeriodType,
    now: DateTime<Utc>,
) -> Result<String, ES::Error>
where
    E: Event + Clone + Send + Sync,
    ES: EventStore<E>,
    ES::Error: crate::decision::IsConcurrencyConflict,
    L: PeriodLedger<E>,
{
    let current = period_id(key, period_type, now);

    let already_open = has_marker(store, ledger, "PeriodOpened", &current).await?;
    if already_open {
        return Ok(current);
    }

    let previous = previous_period_id(key, period_type, now);
    let mut closing_balance = 0i64;
    {
        use futures::StreamExt;
        let query = ledger.period_slice_query(&previous);
        let mut stream = store.stream(&query, Cursor::ZERO);
        while let Some(item) = stream.next().await {
            let persisted = item?;
            ledger.fold_balance(&mut closing_balance, &persisted);
        }
    }

    let close_guard = AppendCondition::new(
        ledger.period_marker_query("PeriodClosed", &previous),
        Cursor::ZERO,
    );
    let closed_event = ledger.make_period_closed(&previous, closing_balance);
    match store.append_if(vec![closed_event], close_guard).await {
        Ok(_) => {}
        Err(err) if err.is_concurrency_conflict() => {}
        Err(err) => return Err(err),
    }

    let open_guard = AppendCondition::new(
        ledger.period_marker_query("PeriodOpened", &current),
        Cursor::ZERO,
    );
    let opened_event = ledger.make_period_opened(&current, closing_balance);
    match store.append_if(vec![opened_event], open_guard).await {
        Ok(_) => {}
        Err(err) if err.is_concurrency_conflict() => {}
        Err(err) => return Err(err),
    }

    Ok(current)
}

async fn has_marker<ES, E, L>(
    store: &ES,
    ledger: &L,
    event_type: &'static str,
    period_id: &str,
) -> Result<bool, ES::Error>
where
    E: Event + Clone + Send + Sync,
    ES: EventStore<E>,
    L: PeriodLedger<E>,
{
    use futures::StreamExt;
    let query = ledger.period_marker_query(event_type, period_id);
    let mut stream = store.stream(&query, Cursor::ZERO);
    Ok(stream.next().await.is_some())
}
