use crate::{db::Db, error::CacheError, store::Store, types::Id};

///
/// EntityKind
///
/// The contract the cache needs from an application-defined entity type.
/// A type implementing `EntityKind` carries its own identifier, validity
/// flag, and (for child kinds) its own foreign key and parent handle as
/// ordinary fields — the cache never needs to know whether a given kind
/// has a parent, only how to turn a row into a value of `Self` and back.
///
/// Root kinds implement `hydrate_one` directly from a row. Child kinds
/// implement it by retrieving the parent through `db`, which keeps the
/// identity guarantee across the relation (see `Db::retrieve`). Child
/// kinds should also override `hydrate_many` so that a bulk fetch
/// resolves its parents in one batched call instead of one per row.
///

pub trait EntityKind: Sized + 'static {
    /// The row representation the store adapter persists and returns.
    type Row: Clone;

    /// The opaque filter expression accepted by `Store::query`.
    type Filter;

    /// Stable name used only for diagnostics and error messages.
    const NAME: &'static str;

    fn id(&self) -> Id<Self>;

    /// One-shot id assignment. Fails if the id is already initialized.
    fn set_id(&mut self, id: Id<Self>) -> Result<(), CacheError>;

    fn is_valid(&self) -> bool;

    fn invalidate(&mut self);

    fn to_row(&self) -> Self::Row;

    /// Reads the primary id out of a row without fully hydrating it.
    /// Used to check the identity map before paying for a hydrate.
    fn row_id(row: &Self::Row) -> i64;

    /// Hook run by `Db::commit` before the row is handed to the store.
    /// Child kinds override this to copy their current parent handle's
    /// id into their foreign key, making the in-memory parent pointer
    /// authoritative over whatever foreign key the entity was
    /// constructed or last loaded with.
    fn sync_before_commit(&mut self) {}

    /// Build `Self` from a freshly fetched row, hydrating any parent
    /// reference through `db`.
    fn hydrate_one<S: Store>(row: Self::Row, db: &Db<S>) -> Result<Self, CacheError>;

    /// Build `Self` for every row in a bulk or filtered fetch. The
    /// default hydrates each row independently; child kinds should
    /// override this to resolve their distinct parent ids with a
    /// single batched `Db::retrieve_many` call instead of one retrieve
    /// per row.
    fn hydrate_many<S: Store>(rows: Vec<Self::Row>, db: &Db<S>) -> Result<Vec<Self>, CacheError> {
        rows.into_iter().map(|row| Self::hydrate_one(row, db)).collect()
    }
}
