//! Event log adapter: partitioned, durable, replayable publish/consume over NATS JetStream
//! (§4.7). See `producer` module docs for the Kafka→JetStream dependency substitution rationale.

pub mod consumer;
pub mod error;
pub mod producer;
pub mod topics;

pub use consumer::{Consumer, Handler, Message};
pub use error::{EventLogError, EventLogResult};
pub use producer::Producer;
