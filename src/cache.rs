use crate::{entity::EntityKind, error::CacheError, types::Id};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
};

pub(crate) type Cell<K> = Rc<RefCell<K>>;

///
/// IdentityMap
///
/// Per-kind, primary-key-indexed set of live entries. At most one live
/// entry ever exists per initialized id (`DuplicateIdError` otherwise);
/// entries with id `0` have not yet been assigned a real id by the
/// store and are kept on a side list (`pending`) rather than in the
/// keyed map, which sidesteps the question of how several uninitialized
/// rows compare to one another (see spec discussion of the "all zero
/// ids are equal" comparator).
///
/// An entry is removed the moment its last external `Handle` drops
/// (see `crate::handle`); the map's own strong reference does not
/// count toward that external-holder count.
///

pub struct IdentityMap<K: EntityKind> {
    by_id: BTreeMap<i64, Cell<K>>,
    pending: Vec<Cell<K>>,
}

impl<K: EntityKind> Default for IdentityMap<K> {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            pending: Vec::new(),
        }
    }
}

impl<K: EntityKind> IdentityMap<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a cached entry by id, regardless of its `valid` flag.
    /// Callers decide whether a tombstoned hit should still be returned.
    pub(crate) fn find(&self, id: Id<K>) -> Option<Cell<K>> {
        self.by_id.get(&id.get()).cloned()
    }

    /// Interns a brand-new, not-yet-persisted entity (id still `0`).
    pub(crate) fn insert_pending(&mut self, entity: K) -> Cell<K> {
        let cell = Rc::new(RefCell::new(entity));
        self.pending.push(Rc::clone(&cell));
        cell
    }

    /// Moves a pending entity into the keyed map once the store has
    /// assigned it a real id. `cell` must already carry that id.
    pub(crate) fn promote_pending(&mut self, cell: &Cell<K>) -> Result<(), CacheError> {
        let id = cell.borrow().id().get();
        debug_assert!(id > 0, "promote_pending called before id assignment");

        if self.by_id.contains_key(&id) {
            return Err(CacheError::DuplicateId {
                entity: K::NAME,
                id,
            });
        }

        let pos = self
            .pending
            .iter()
            .position(|e| Rc::ptr_eq(e, cell))
            .expect("entity missing from pending list during promotion");
        let promoted = self.pending.remove(pos);
        self.by_id.insert(id, promoted);
        Ok(())
    }

    /// Interns an entity fetched from the store, which already carries
    /// its real id. Used by `retrieve`/`retrieve_many`/`retrieve_filtered`
    /// after a cache miss.
    pub(crate) fn intern_fetched(&mut self, entity: K) -> Result<Cell<K>, CacheError> {
        let id = entity.id().get();
        debug_assert!(id > 0, "fetched entity must already have a real id");

        if self.by_id.contains_key(&id) {
            return Err(CacheError::DuplicateId {
                entity: K::NAME,
                id,
            });
        }

        let cell = Rc::new(RefCell::new(entity));
        self.by_id.insert(id, Rc::clone(&cell));
        Ok(cell)
    }

    /// Removes `cell` from whichever bucket currently holds it. No-op
    /// (other than a debug check) if it is somehow already gone.
    pub(crate) fn erase(&mut self, cell: &Cell<K>) {
        let id = cell.borrow().id().get();
        if id > 0 {
            if let Some(existing) = self.by_id.get(&id) {
                if Rc::ptr_eq(existing, cell) {
                    self.by_id.remove(&id);
                }
            }
        } else {
            self.pending.retain(|e| !Rc::ptr_eq(e, cell));
        }
    }

    /// True if `id` currently names a live entry in the keyed map.
    /// Exposed for tests asserting the identity/eviction invariants.
    #[must_use]
    pub fn contains(&self, id: Id<K>) -> bool {
        self.by_id.contains_key(&id.get())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
