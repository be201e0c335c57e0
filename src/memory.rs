//! A reference `Store` implementation backed by an in-memory table per
//! entity kind. Exists for tests and demos; a real deployment plugs in
//! its own adapter over whatever relational store it actually runs.

use crate::{entity::EntityKind, error::StoreAccessError, store::Store};
use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

/// Per-kind opaque table: the row type and next-id counter, boxed so a
/// single `HashMap` can hold every registered kind's table.
struct Table<K: EntityKind> {
    rows: BTreeMap<i64, K::Row>,
    next_id: i64,
}

impl<K: EntityKind> Default for Table<K> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// A predicate over a kind's filter and rows, registered per kind so
/// `query` has something to evaluate against. Tests wire this up with
/// `MemoryStore::set_filter`.
type FilterFn<K> = Box<dyn Fn(&<K as EntityKind>::Filter, &<K as EntityKind>::Row) -> bool>;

#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<TypeId, Box<dyn Any>>>,
    filters: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers how `query::<K>` should match a filter against a row.
    /// Must be called once per kind before `retrieve_filtered` is used
    /// for that kind.
    pub fn set_filter<K: EntityKind>(
        &self,
        predicate: impl Fn(&K::Filter, &K::Row) -> bool + 'static,
    ) {
        self.filters
            .borrow_mut()
            .insert(TypeId::of::<K>(), Box::new(Box::new(predicate) as FilterFn<K>));
    }

    fn table<K: EntityKind>(&self) -> std::cell::RefMut<'_, HashMap<TypeId, Box<dyn Any>>> {
        {
            let mut tables = self.tables.borrow_mut();
            tables
                .entry(TypeId::of::<K>())
                .or_insert_with(|| Box::new(Table::<K>::default()));
        }
        self.tables.borrow_mut()
    }

    fn with_table<K, R>(&self, f: impl FnOnce(&mut Table<K>) -> R) -> R
    where
        K: EntityKind,
    {
        let mut tables = self.table::<K>();
        let boxed = tables.get_mut(&TypeId::of::<K>()).expect("table registered above");
        let table = boxed.downcast_mut::<Table<K>>().expect("table type mismatch");
        f(table)
    }
}

impl Store for MemoryStore {
    fn insert<K: EntityKind>(&self, row: K::Row) -> Result<i64, StoreAccessError> {
        Ok(self.with_table::<K, _>(|table| {
            let id = table.next_id;
            table.next_id += 1;
            table.rows.insert(id, row);
            id
        }))
    }

    fn get<K: EntityKind>(&self, id: i64) -> Result<K::Row, StoreAccessError> {
        self.with_table::<K, _>(|table| table.rows.get(&id).cloned())
            .ok_or(StoreAccessError::NotFound)
    }

    fn get_many<K: EntityKind>(&self, ids: &[i64]) -> Result<Vec<K::Row>, StoreAccessError> {
        Ok(self.with_table::<K, _>(|table| {
            ids.iter().filter_map(|id| table.rows.get(id).cloned()).collect()
        }))
    }

    fn query<K: EntityKind>(&self, filter: &K::Filter) -> Result<Vec<K::Row>, StoreAccessError> {
        let filters = self.filters.borrow();
        let predicate = filters
            .get(&TypeId::of::<K>())
            .and_then(|boxed| boxed.downcast_ref::<FilterFn<K>>())
            .ok_or_else(|| StoreAccessError::Failure(format!("no filter registered for {}", K::NAME)))?;

        Ok(self.with_table::<K, _>(|table| {
            table
                .rows
                .values()
                .filter(|row| predicate(filter, row))
                .cloned()
                .collect()
        }))
    }

    fn update<K: EntityKind>(&self, row: K::Row) -> Result<(), StoreAccessError> {
        let id = K::row_id(&row);
        self.with_table::<K, _>(|table| {
            if table.rows.contains_key(&id) {
                table.rows.insert(id, row);
                Ok(())
            } else {
                Err(StoreAccessError::NotFound)
            }
        })
    }

    fn remove<K: EntityKind>(&self, id: i64) -> Result<(), StoreAccessError> {
        self.with_table::<K, _>(|table| {
            if table.rows.remove(&id).is_some() {
                Ok(())
            } else {
                Err(StoreAccessError::NotFound)
            }
        })
    }
}
