//! Error taxonomy for the cache and its store adapter.

use thiserror::Error as ThisError;

///
/// StoreAccessError
///
/// The narrow error surface a backing-store adapter is allowed to raise.
/// Adapters are free to carry richer internal errors; at the adapter
/// boundary they collapse to one of these two shapes.
///

#[derive(Clone, Debug, ThisError)]
pub enum StoreAccessError {
    #[error("row not found")]
    NotFound,

    #[error("store failure: {0}")]
    Failure(String),
}

///
/// CacheError
///
/// Errors produced by the identity-mapped cache facade. Variants mirror
/// the taxonomy of kinds the cache is specified to raise; they are not
/// tied to any particular backing-store implementation.
///

#[derive(Clone, Debug, ThisError)]
pub enum CacheError {
    /// A facade call named an entity kind that is not registered.
    ///
    /// In this crate entity kinds are checked at compile time via the
    /// `EntityKind` trait bound, so this variant is unreachable through
    /// the typed API. It is kept for callers that build dynamic dispatch
    /// on top of this crate.
    #[error("unknown entity kind: {0}")]
    UnknownKind(&'static str),

    /// `set_id` was called on an entity whose id is already initialized.
    #[error("id already set")]
    IllegalState,

    /// `commit` or `remove` was called with a handle whose entry is not
    /// (or is no longer) present in the identity map.
    #[error("entity not cached")]
    EntityNotCached,

    /// Two live entries in the same identity map claimed the same
    /// initialized id. Always indicates a misbehaving store adapter.
    #[error("duplicate id {id} in {entity} cache")]
    DuplicateId { entity: &'static str, id: i64 },

    /// A bulk or filtered fetch returned a child row whose foreign key
    /// resolved to no parent row.
    #[error("dangling foreign key: {entity} row references missing {parent} id {fk_id}")]
    DanglingForeignKey {
        entity: &'static str,
        parent: &'static str,
        fk_id: i64,
    },

    /// The store adapter reported that a requested row does not exist.
    #[error("{entity} id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The store adapter reported an I/O or constraint failure.
    #[error("store error ({entity}): {message}")]
    Store { entity: &'static str, message: String },

    /// A date/time helper failed to parse its input.
    #[error("parse error: {0}")]
    Parse(String),
}

impl CacheError {
    pub(crate) fn from_store(
        entity: &'static str,
        id: i64,
        err: StoreAccessError,
    ) -> Self {
        match err {
            StoreAccessError::NotFound => Self::NotFound { entity, id },
            StoreAccessError::Failure(message) => Self::Store { entity, message },
        }
    }
}
