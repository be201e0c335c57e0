use crate::{entity::EntityKind, error::StoreAccessError};

///
/// Store
///
/// The narrow capability set the cache requires from a backing store.
/// Implementations are external to the cache (a SQL engine, a row-
/// oriented key/value store, an in-memory stub for tests) and are
/// treated as opaque: the cache never inspects rows beyond what
/// `EntityKind` exposes, and never assumes multi-operation atomicity
/// beyond what a single call provides.
///
/// Every method is generic over the entity kind it serves rather than
/// being duplicated per kind on the trait; a concrete adapter typically
/// dispatches on `K::NAME` or on a per-kind table/collection it already
/// owns.
///

pub trait Store {
    /// Persists `row`, returning the fresh, monotonically-increasing
    /// positive id the store assigned.
    fn insert<K: EntityKind>(&self, row: K::Row) -> Result<i64, StoreAccessError>;

    /// Fetches the row for `id`.
    fn get<K: EntityKind>(&self, id: i64) -> Result<K::Row, StoreAccessError>;

    /// Fetches the rows for the subset of `ids` that exist. Order is
    /// unspecified; ids with no matching row are silently omitted.
    fn get_many<K: EntityKind>(&self, ids: &[i64]) -> Result<Vec<K::Row>, StoreAccessError>;

    /// Fetches every row matching an opaque filter expression.
    fn query<K: EntityKind>(&self, filter: &K::Filter) -> Result<Vec<K::Row>, StoreAccessError>;

    /// Persists a full row by primary key. Fails if the row is absent.
    fn update<K: EntityKind>(&self, row: K::Row) -> Result<(), StoreAccessError>;

    /// Deletes a row by primary key. Fails if the row is absent.
    fn remove<K: EntityKind>(&self, id: i64) -> Result<(), StoreAccessError>;
}
