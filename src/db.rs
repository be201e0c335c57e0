use crate::{
    cache::IdentityMap,
    entity::EntityKind,
    error::CacheError,
    handle::Handle,
    store::Store,
    types::Id,
};
use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

///
/// Db
///
/// The facade callers interact with: one identity map per entity kind
/// that has ever been touched, plus the store adapter. Maps are created
/// lazily and keyed by `TypeId`, so `Db` does not need a closed,
/// hand-written list of every registered kind — any type implementing
/// `EntityKind` can be cached through it.
///
/// `Db` is not `Sync`; a single instance is not safe to share across
/// threads (see the crate's concurrency notes). It outlives every
/// `Handle` it has issued, since each map is kept alive by an `Rc`
/// shared between `Db` and the handles it hands out.
///

pub struct Db<S: Store> {
    store: S,
    caches: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl<S: Store> Db<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            caches: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn cache<K: EntityKind>(&self) -> Rc<RefCell<IdentityMap<K>>> {
        let mut caches = self.caches.borrow_mut();
        let boxed = caches
            .entry(TypeId::of::<K>())
            .or_insert_with(|| Box::new(Rc::new(RefCell::new(IdentityMap::<K>::new()))));
        boxed
            .downcast_ref::<Rc<RefCell<IdentityMap<K>>>>()
            .expect("identity map type mismatch for TypeId")
            .clone()
    }

    /// Constructs a brand-new entry (id `0`), interns it, then asks the
    /// store to persist it and assign a real id. If the store rejects
    /// the row, the entry is erased from the map before the error is
    /// returned — the map never holds something the store refused.
    pub fn create<K: EntityKind>(&self, entity: K) -> Result<Handle<K>, CacheError> {
        let map = self.cache::<K>();
        let cell = map.borrow_mut().insert_pending(entity);

        let row = cell.borrow().to_row();
        match self.store.insert::<K>(row) {
            Ok(new_id) => {
                cell.borrow_mut().set_id(Id::new(new_id))?;
                map.borrow_mut().promote_pending(&cell)?;
                Ok(Handle::new(cell, map))
            }
            Err(err) => {
                map.borrow_mut().erase(&cell);
                Err(CacheError::from_store(K::NAME, 0, err))
            }
        }
    }

    /// Looks up `id` in the identity map. A valid hit is returned
    /// without touching the store; a miss, or a tombstoned hit, falls
    /// through to the store and interns whatever it returns.
    pub fn retrieve<K: EntityKind>(&self, id: Id<K>) -> Result<Handle<K>, CacheError> {
        let map = self.cache::<K>();

        let hit = map.borrow().find(id).filter(|cell| cell.borrow().is_valid());
        if let Some(cell) = hit {
            return Ok(Handle::new(cell, map));
        }

        let row = self
            .store
            .get::<K>(id.get())
            .map_err(|err| CacheError::from_store(K::NAME, id.get(), err))?;
        let entity = K::hydrate_one(row, self)?;
        let cell = map.borrow_mut().intern_fetched(entity)?;
        Ok(Handle::new(cell, map))
    }

    /// Bulk fetch by id set. Rows already present in the map are
    /// returned unchanged (their in-memory mutations are never
    /// overwritten by the store's copy); only genuinely new rows are
    /// hydrated, and child kinds hydrate them with one batched parent
    /// fetch rather than one retrieve per row.
    pub fn retrieve_many<K: EntityKind>(&self, ids: &[Id<K>]) -> Result<Vec<Handle<K>>, CacheError> {
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = self
            .store
            .get_many::<K>(&raw_ids)
            .map_err(|err| CacheError::from_store(K::NAME, 0, err))?;
        self.intern_rows(rows)
    }

    /// Fetch by opaque filter. Same non-overwriting intern policy as
    /// `retrieve_many`.
    pub fn retrieve_filtered<K: EntityKind>(
        &self,
        filter: &K::Filter,
    ) -> Result<Vec<Handle<K>>, CacheError> {
        let rows = self
            .store
            .query::<K>(filter)
            .map_err(|err| CacheError::from_store(K::NAME, 0, err))?;
        self.intern_rows(rows)
    }

    fn intern_rows<K: EntityKind>(&self, rows: Vec<K::Row>) -> Result<Vec<Handle<K>>, CacheError> {
        let map = self.cache::<K>();

        let mut cached: HashMap<i64, crate::cache::Cell<K>> = HashMap::new();
        let mut fresh_rows = Vec::new();
        for row in &rows {
            let row_id = K::row_id(row);
            match map.borrow().find(Id::new(row_id)) {
                Some(cell) => {
                    cached.insert(row_id, cell);
                }
                None => fresh_rows.push(row.clone()),
            }
        }

        let hydrated = K::hydrate_many(fresh_rows, self)?;
        let mut freshly_interned = HashMap::new();
        for entity in hydrated {
            let row_id = entity.id().get();
            let cell = map.borrow_mut().intern_fetched(entity)?;
            freshly_interned.insert(row_id, cell);
        }

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            let row_id = K::row_id(row);
            let cell = cached
                .get(&row_id)
                .or_else(|| freshly_interned.get(&row_id))
                .cloned()
                .expect("row was neither already cached nor freshly interned");
            results.push(Handle::new(cell, map.clone()));
        }
        Ok(results)
    }

    /// Synchronizes any parent-derived state (`EntityKind::sync_before_commit`)
    /// and asks the store to persist the handle's current in-memory state.
    pub fn commit<K: EntityKind>(&self, handle: &Handle<K>) -> Result<(), CacheError> {
        let map = self.cache::<K>();
        if !map.borrow().contains(handle.id()) {
            return Err(CacheError::EntityNotCached);
        }

        handle.borrow_mut().sync_before_commit();
        let row = handle.borrow().to_row();
        self.store
            .update::<K>(row)
            .map_err(|err| CacheError::from_store(K::NAME, handle.id().get(), err))
    }

    /// Deletes the row, tombstones the entry, and consumes `handle` —
    /// the caller's binding is moved out, so it cannot be used again.
    /// Other outstanding handles to the same entry observe
    /// `is_valid() == false` from this point on.
    pub fn remove<K: EntityKind>(&self, handle: Handle<K>) -> Result<(), CacheError> {
        let map = self.cache::<K>();
        let id = handle.id();
        if !map.borrow().contains(id) {
            return Err(CacheError::EntityNotCached);
        }

        self.store
            .remove::<K>(id.get())
            .map_err(|err| CacheError::from_store(K::NAME, id.get(), err))?;
        handle.borrow_mut().invalidate();
        drop(handle);
        Ok(())
    }
}
