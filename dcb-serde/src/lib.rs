//! # Event Payload Serialization Library
//!
//! Traits and implementations for serializing and deserializing event
//! payloads, with implementations for common formats such as Avro, JSON, and
//! Protocol Buffers (Prost).
pub mod serde;
pub use crate::serde::{Deserializer, Error, Serde, Serializer};
