//! Domain models and synthetic traffic generation.
//!
//! Provides the wire types relayed to the registered callback endpoint
//! (contacts, messages, status events, delivery units), the explicit
//! object-reuse pools those types cycle through, the clock abstraction used
//! by time-dependent components, and the generator that fabricates inbound
//! traffic. The webhook pipeline and the HTTP layer both build on this
//! crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod generator;
pub mod models;
pub mod pool;
pub mod time;

pub use error::{CoreError, Result};
pub use generator::Generators;
pub use models::{
    Contact, DeliveryUnit, ErrorEntry, MediaContent, Message, MessageContext, MessageType,
    Profile, StatusEvent, StatusKind, TextContent,
};
pub use pool::{Pool, Pools, Reusable};
pub use time::{Clock, RealClock, TestClock};
