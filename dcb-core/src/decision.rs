//! A Decision serves as a building block for developing the business logic
//! of an application: hydrate a `State` from the log, derive new events from
//! it, and append them back under a guard that fails if the state went stale
//! in between.
use futures::TryStreamExt;

use crate::event::{Cursor, Event, PersistedEvent};
use crate::event_store::{AppendCondition, EventStore};
use crate::query::Query;

/// A business concept built by folding events through `mutate`.
pub trait State: Default + Clone + Send + Sync {
    type Event: Event + Clone + Send + Sync;

    /// The query used to retrieve the events relevant to this state.
    fn query(&self) -> Query;

    /// Mutates the state in response to one event.
    fn mutate(&mut self, event: Self::Event);
}

/// Represents a business decision taken from the occurred events.
pub trait Decision: Send + Sync {
    type Event: Event + Clone + Send + Sync;
    type State: State<Event = Self::Event>;
    type Error: Send + Sync;

    /// The state this decision hydrates before calling `process`.
    fn default_state(&self) -> Self::State {
        Self::State::default()
    }

    /// The query used to validate the decision at append time. When `None`,
    /// the hydrated state's own query is reused, meaning any event that
    /// would change the state invalidates the decision. A narrower query
    /// lets events that don't affect the outcome (e.g. a deposit when only
    /// a withdrawal can break a sufficient-balance decision) through without
    /// forcing a retry.
    fn validation_query(&self) -> Option<Query> {
        None
    }

    /// Processes the decision from the hydrated state.
    fn process(&self, state: &Self::State) -> Result<Vec<Self::Event>, Self::Error>;
}

/// How many times `DecisionMaker::make` retries a decision after a
/// concurrency conflict before giving up.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// The outcome of a successful `DecisionMaker::make` call.
pub struct PersistedDecision<S, E: Event> {
    state: S,
    events: Vec<PersistedEvent<E>>,
}

impl<S, E: Event> PersistedDecision<S, E> {
    /// The state used to derive the decision.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The persisted events produced by the decision.
    pub fn events(&self) -> &[PersistedEvent<E>] {
        &self.events
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error<ES, DE> {
    #[error("event store error: {0}")]
    EventStore(#[source] ES),
    #[error("domain error: {0}")]
    Domain(#[source] DE),
    #[error("decision did not converge after {attempts} attempts due to repeated conflicts")]
    RetriesExhausted { attempts: u32 },
}

/// Executes business decisions against an `EventStore`.
#[derive(Clone)]
pub struct DecisionMaker<ES> {
    event_store: ES,
    retry_policy: RetryPolicy,
}

impl<ES> DecisionMaker<ES> {
    pub fn new(event_store: ES) -> Self {
        Self {
            event_store,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Makes the given business decision and persists the resulting events.
    ///
    /// Hydrates `D::State` from the log, calls `decision.process`, then
    /// appends under a guard keyed on `validation_query` (or the state's own
    /// query). On `StoreError::ConcurrencyConflict` the whole cycle —
    /// hydrate, process, append — is retried up to `retry_policy.max_attempts`
    /// times.
    pub async fn make<D, E>(
        &self,
        decision: D,
    ) -> Result<PersistedDecision<D::State, E>, Error<ES::Error, D::Error>>
    where
        E: Event + Clone + Sync + Send,
        ES: EventStore<E>,
        D: Decision<Event = E>,
        ES::Error: IsConcurrencyConflict + 'static,
        D::Error: 'static,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let default_state = decision.default_state();
            let query = default_state.query();
            let (state, cursor) = self
                .event_store
                .stream(&query, Cursor::ZERO)
                .try_fold((default_state, Cursor::ZERO), |(mut state, _), evt| async move {
                    let cursor = evt.cursor();
                    state.mutate(evt.into_inner());
                    Ok((state, cursor))
                })
                .await
                .map_err(Error::EventStore)?;

            let changes = decision.process(&state).map_err(Error::Domain)?;

            let condition = AppendCondition::new(
                decision.validation_query().unwrap_or_else(|| state.query()),
                cursor,
            );

            match self.event_store.append_if(changes, condition).await {
                Ok(events) => return Ok(PersistedDecision { state, events }),
                Err(err) if err.is_concurrency_conflict() && attempts < self.retry_policy.max_attempts => {
                    continue;
                }
                Err(err) if err.is_concurrency_conflict() => {
                    return Err(Error::RetriesExhausted { attempts });
                }
                Err(err) => return Err(Error::EventStore(err)),
            }
        }
    }
}

/// Lets `DecisionMaker::make` recognize a retryable conflict without
/// depending on a concrete error type.
pub trait IsConcurrencyConflict {
    fn is_concurrency_conflict(&self) -> bool;
}
