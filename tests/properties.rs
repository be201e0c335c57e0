use entity_cache::{
    db::Db,
    domain::{Category, CategoryRow, CategorySchema},
    memory::MemoryStore,
    store::Store,
    types::Id,
};
use proptest::prelude::*;

fn schema(n: usize) -> CategorySchema {
    CategorySchema {
        name: format!("c{n}"),
        image: None,
        archived: false,
    }
}

proptest! {
    /// Invariant: the n-th entity ever created for a kind gets id n,
    /// regardless of how many were created before it in the same run.
    #[test]
    fn ids_are_assigned_in_monotonic_creation_order(count in 1usize..64) {
        let db = Db::new(MemoryStore::new());
        for n in 1..=count {
            let handle = db.create(Category::new(schema(n))).unwrap();
            prop_assert_eq!(handle.id().get(), n as i64);
        }
    }

    /// Invariant: while at least one clone of a handle is alive, every
    /// retrieve of that id returns a handle pointing at the same entry.
    /// Only once every clone has dropped does the cache fall through to
    /// the store.
    #[test]
    fn entry_survives_until_every_clone_drops(
        num_clones in 1usize..6,
        drop_order in proptest::collection::vec(any::<u8>(), 1..12),
    ) {
        let db = Db::new(MemoryStore::new());
        let original = db.create(Category::new(schema(0))).unwrap();
        let id = original.id();
        let mut remaining: Vec<_> = (0..num_clones).map(|_| original.clone()).collect();
        drop(original);

        for raw in drop_order {
            if remaining.is_empty() {
                break;
            }
            let idx = (raw as usize) % remaining.len();

            let probe = db.retrieve::<Category>(id).unwrap();
            prop_assert!(probe.same_entry(&remaining[idx]));
            drop(probe);

            remaining.remove(idx);
        }
        prop_assert!(remaining.is_empty());

        db.store()
            .update::<Category>(CategoryRow {
                id: id.get(),
                name: "reloaded-after-eviction".into(),
                image: None,
                archived: false,
            })
            .unwrap();

        let fresh = db.retrieve::<Category>(id).unwrap();
        prop_assert_eq!(fresh.borrow().name.clone(), "reloaded-after-eviction");
    }

    /// Invariant: set_id fails once an id is already initialized,
    /// whatever positive value is attempted.
    #[test]
    fn set_id_is_one_shot(second_id in 1i64..i64::MAX) {
        let db = Db::new(MemoryStore::new());
        let handle = db.create(Category::new(schema(0))).unwrap();
        let err = handle.borrow_mut().set_id(Id::new(second_id)).unwrap_err();
        prop_assert!(matches!(err, entity_cache::error::CacheError::IllegalState));
    }
}
