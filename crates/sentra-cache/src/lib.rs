//! # sentra-cache: TTL + LRU caching primitives
//!
//! A small generic cache with two eviction mechanisms layered together:
//!
//! - **TTL**: every entry carries an expiry instant; expired entries are
//!   removed lazily on read (a `get` that finds an expired entry deletes it
//!   and counts a miss).
//! - **LRU**: when the cache is at capacity and a new key arrives, the
//!   entry with the oldest last-access instant is evicted. Access time is
//!   refreshed on both `get` and `set`, so this is true LRU, not insertion
//!   order.
//!
//! The crate also carries the category TTL table used by the decision
//! cache façade and deterministic key helpers for composite lookups.

mod keys;
mod ttl;

pub use keys::composite_key;
pub use ttl::{CacheCategory, CacheStats, TtlCache};
