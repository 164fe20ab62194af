//! Block-subscription feed pool (spec §4.2): opens/reuses gRPC
//! subscriptions to the block-subscription endpoint and hands each owning
//! Consumer a lazy, infinite `Update` stream, reconnecting underneath with
//! capped exponential backoff.

pub mod connection;
pub mod pool;
pub mod types;

pub use pool::{FeedClient, Stream};
pub use types::{AccountUpdate, SubscriptionFilter, TransactionUpdate, Update};
