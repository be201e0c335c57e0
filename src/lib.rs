//! Identity-mapped entity cache layered over a pluggable backing store.
//!
//! The cache guarantees at most one live in-memory instance per
//! (entity kind, id). Callers hold reference-counted [`handle::Handle`]s to
//! cached entries; the last external handle to drop evicts its entry.
//! Foreign keys between entity kinds are hydrated transparently and
//! preserve that identity guarantee across parent/child relations.
//!
//! The cache is single-threaded: nothing here is `Sync`, and no
//! internal locking is attempted. See [`db::Db`] for the entry point.

pub mod cache;
pub mod datetime;
pub mod db;
pub mod domain;
pub mod entity;
pub mod error;
pub mod handle;
pub mod memory;
pub mod store;
pub mod types;

pub mod prelude {
    pub use crate::{
        db::Db,
        entity::EntityKind,
        error::{CacheError, StoreAccessError},
        handle::Handle,
        memory::MemoryStore,
        store::Store,
        types::Id,
    };
}
