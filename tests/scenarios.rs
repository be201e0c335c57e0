use entity_cache::{
    db::Db,
    domain::{
        Category, CategoryFilter, CategorySchema, Description, DescriptionFilter,
        DescriptionSchema,
    },
    entity::EntityKind,
    error::{CacheError, StoreAccessError},
    memory::MemoryStore,
    store::Store,
    types::Id,
};

fn category_schema(name: &str) -> CategorySchema {
    CategorySchema {
        name: name.into(),
        image: None,
        archived: false,
    }
}

fn description_schema(name: &str) -> DescriptionSchema {
    DescriptionSchema {
        name: name.into(),
        barcode: None,
        days_valid_suggestion: 7,
        image: None,
        archived: false,
    }
}

fn store_with_filters() -> MemoryStore {
    let store = MemoryStore::new();
    store.set_filter::<Category>(|filter: &CategoryFilter, row| {
        filter.archived.map_or(true, |archived| row.archived == archived)
    });
    store.set_filter::<Description>(|filter: &DescriptionFilter, row| {
        filter.category_id.map_or(true, |id| row.category_id == id)
            && filter
                .barcode
                .as_ref()
                .map_or(true, |barcode| row.barcode.as_deref() == Some(barcode.as_str()))
    });
    store
}

/// S1 — monotonic ids: the n-th created Category gets id == n.
#[test]
fn s1_monotonic_ids() {
    let db = Db::new(store_with_filters());
    for n in 1..=100i64 {
        let handle = db.create(Category::new(category_schema("c"))).unwrap();
        assert_eq!(handle.id().get(), n);
    }
}

/// S2 — id immutability: a second set_id on an already-initialized
/// entity fails with IllegalState.
#[test]
fn s2_id_immutability() {
    let db = Db::new(store_with_filters());
    let handle = db.create(Category::new(category_schema("c"))).unwrap();
    let err = handle.borrow_mut().set_id(Id::new(2)).unwrap_err();
    assert!(matches!(err, CacheError::IllegalState));
}

/// S3 — identity after retrieve: the handle returned by retrieve shares
/// the same entry as the handle from create.
#[test]
fn s3_identity_after_retrieve() {
    let db = Db::new(store_with_filters());
    let c = db.create(Category::new(category_schema("c"))).unwrap();
    let c2 = db.retrieve::<Category>(c.id()).unwrap();
    assert!(c.same_entry(&c2));

    c2.borrow_mut().name = "renamed".into();
    assert_eq!(c.borrow().name, "renamed");
}

/// S4 — parent hydration: retrieving a child with an empty cache
/// hydrates its parent, and a direct retrieve of the parent afterward
/// returns that same entry.
#[test]
fn s4_parent_hydration() {
    let store = store_with_filters();
    let category_row = store.insert::<Category>(entity_cache::domain::CategoryRow {
        id: 0,
        name: "y".into(),
        image: None,
        archived: false,
    });
    let category_id = category_row.unwrap();
    assert_eq!(category_id, 1);

    let description_id = store
        .insert::<Description>(entity_cache::domain::DescriptionRow {
            id: 0,
            category_id,
            name: "x".into(),
            barcode: None,
            days_valid_suggestion: 7,
            image: None,
            archived: false,
        })
        .unwrap();

    let db = Db::new(store);
    let description = db.retrieve::<Description>(Id::new(description_id)).unwrap();
    assert_eq!(description.borrow().category().id().get(), category_id);
    assert_eq!(description.borrow().category().borrow().name, "y");

    let category_again = db.retrieve::<Category>(Id::new(category_id)).unwrap();
    assert!(description.borrow().category().same_entry(&category_again));
}

/// S5 — bulk fetch preserves edits: an in-map entry's mutations survive
/// a retrieve_filtered call even though the store's row is stale.
#[test]
fn s5_bulk_fetch_preserves_edits() {
    let db = Db::new(store_with_filters());
    let handle = db.create(Category::new(category_schema("original"))).unwrap();
    handle.borrow_mut().name = "edited".into();

    let results = db
        .retrieve_filtered::<Category>(&CategoryFilter { archived: None })
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].same_entry(&handle));
    assert_eq!(results[0].borrow().name, "edited");
}

/// S6 — remove and tombstone: other handles observe is_valid() == false,
/// and a subsequent retrieve hits a store that has genuinely deleted the
/// row.
#[test]
fn s6_remove_and_tombstone() {
    let db = Db::new(store_with_filters());
    let mut handles = Vec::new();
    for _ in 0..10 {
        handles.push(db.create(Category::new(category_schema("c"))).unwrap());
    }

    let target = handles[4].clone();
    let id = target.id();
    assert_eq!(id.get(), 5);

    db.remove(handles.remove(4)).unwrap();
    assert!(!target.is_valid());

    let err = db.retrieve::<Category>(id).unwrap_err();
    assert!(matches!(err, CacheError::NotFound { .. }));
}

/// S7 — eviction on last-drop: dropping every handle to an entry forces
/// the next retrieve to consult the store again.
#[test]
fn s7_eviction_on_last_drop() {
    let store = store_with_filters();
    let db = Db::new(store);
    let handle = db.create(Category::new(category_schema("c"))).unwrap();
    let id = handle.id();
    drop(handle);

    // Mutate the store directly to prove the cache actually went back
    // to it rather than serving a stale in-map hit.
    db.store()
        .update::<Category>(entity_cache::domain::CategoryRow {
            id: id.get(),
            name: "reloaded".into(),
            image: None,
            archived: false,
        })
        .unwrap();

    let reloaded = db.retrieve::<Category>(id).unwrap();
    assert_eq!(reloaded.borrow().name, "reloaded");
}

/// Invariant 2 & 3: handle existence implies map membership, and the
/// map never holds an entry with zero external handles.
#[test]
fn handle_implies_membership_and_eviction_is_exact() {
    let db = Db::new(store_with_filters());
    let h1 = db.create(Category::new(category_schema("c"))).unwrap();
    let h2 = h1.clone();

    drop(h1);
    let reretrieved = db.retrieve::<Category>(h2.id()).unwrap();
    assert!(reretrieved.same_entry(&h2), "entry must still be cached while h2 lives");

    drop(h2);
    drop(reretrieved);
}

/// Creation failure must leave no trace in the map: a pending entry
/// whose store insert fails is erased, so a later insert for the same
/// logical row does not collide.
#[test]
fn failed_create_erases_pending_entry() {
    struct FailingStore;
    impl entity_cache::store::Store for FailingStore {
        fn insert<K: EntityKind>(&self, _row: K::Row) -> Result<i64, StoreAccessError> {
            Err(StoreAccessError::Failure("disk full".into()))
        }
        fn get<K: EntityKind>(&self, _id: i64) -> Result<K::Row, StoreAccessError> {
            Err(StoreAccessError::NotFound)
        }
        fn get_many<K: EntityKind>(&self, _ids: &[i64]) -> Result<Vec<K::Row>, StoreAccessError> {
            Ok(Vec::new())
        }
        fn query<K: EntityKind>(&self, _filter: &K::Filter) -> Result<Vec<K::Row>, StoreAccessError> {
            Ok(Vec::new())
        }
        fn update<K: EntityKind>(&self, _row: K::Row) -> Result<(), StoreAccessError> {
            Err(StoreAccessError::NotFound)
        }
        fn remove<K: EntityKind>(&self, _id: i64) -> Result<(), StoreAccessError> {
            Err(StoreAccessError::NotFound)
        }
    }

    let db = Db::new(FailingStore);
    let err = db.create(Category::new(category_schema("c"))).unwrap_err();
    assert!(matches!(err, CacheError::Store { .. }));
}

/// Dangling foreign key: a bulk fetch whose child row's parent id does
/// not exist in the store raises DanglingForeignKey rather than
/// NotFound.
#[test]
fn dangling_foreign_key_on_bulk_hydrate() {
    let store = store_with_filters();
    let description_id = store
        .insert::<Description>(entity_cache::domain::DescriptionRow {
            id: 0,
            category_id: 999,
            name: "orphan".into(),
            barcode: None,
            days_valid_suggestion: 7,
            image: None,
            archived: false,
        })
        .unwrap();

    let db = Db::new(store);
    let err = db
        .retrieve_filtered::<Description>(&DescriptionFilter::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CacheError::DanglingForeignKey {
            fk_id: 999,
            ..
        }
    ));
    let _ = description_id;
}
