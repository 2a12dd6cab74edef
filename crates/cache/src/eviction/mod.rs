//! Least-recently-used eviction under a byte budget
//!
//! [`LruStore`] keeps entries in recency order inside a slot arena and evicts
//! from the cold end whenever the total size of keys and values exceeds the
//! configured capacity.

mod arena;
mod store;

pub use store::{ByteSize, EvictionCallback, LruStore};

#[cfg(test)]
mod tests;
