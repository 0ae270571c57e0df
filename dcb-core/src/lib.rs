#![doc = include_str!("../README.md")]

pub mod backoff;
pub mod decision;
pub mod error;
pub mod event;
pub mod event_store;
pub mod handler;
pub mod leader;
pub mod period;
pub mod progress;
pub mod projection;
pub mod query;
pub mod subscription;
pub mod tags;
pub mod testing;

#[doc(inline)]
pub use crate::backoff::{BackoffConfig, BackoffController};
#[doc(inline)]
pub use crate::decision::{
    Decision, DecisionMaker, Error as DecisionError, PersistedDecision, RetryPolicy, State,
};
#[doc(inline)]
pub use crate::error::StoreError;
#[doc(inline)]
pub use crate::event::{AppendEvent, CommandRecord, Cursor, Event, PersistedEvent, Position, TxId};
#[doc(inline)]
pub use crate::event_store::{AppendCondition, EventStore};
#[doc(inline)]
pub use crate::handler::{EventHandler, HandlerError};
#[doc(inline)]
pub use crate::leader::{hash_lock_name, LeaderElector};
#[doc(inline)]
pub use crate::period::{period_id, resolve_active_period, PeriodLedger, PeriodType};
#[doc(inline)]
pub use crate::progress::{ProcessorId, ProcessorStatus, Progress, ProgressTracker};
#[doc(inline)]
pub use crate::projection::{project, Projector};
#[doc(inline)]
pub use crate::query::{query, Query, QueryItem};
#[doc(inline)]
pub use crate::subscription::Subscription;
#[doc(inline)]
pub use crate::tags::{Tag, TagSet};
#[doc(inline)]
pub use crate::testing::TestHarness;

pub type BoxDynError = Box<dyn std::error::Error + 'static + Send + Sync>;

#[cfg(feature = "macros")]
pub use dcb_macros::Event;

#[cfg(feature = "serde")]
pub mod serde {
    //! Event payload serialization/deserialization.
    #[cfg(feature = "serde-avro")]
    #[doc(inline)]
    pub use dcb_serde::serde::avro;
    #[cfg(feature = "serde-json")]
    #[doc(inline)]
    pub use dcb_serde::serde::json;
    #[cfg(feature = "serde-messagepack")]
    #[doc(inline)]
    pub use dcb_serde::serde::messagepack;
    #[cfg(feature = "serde-prost")]
    #[doc(inline)]
    pub use dcb_serde::serde::prost;
    #[cfg(feature = "serde-protobuf")]
    #[doc(inline)]
    pub use dcb_serde::serde::protobuf;
    #[doc(inline)]
    pub use dcb_serde::{Deserializer, Serde, Serializer};
}
