use crate::{
    cache::{Cell, IdentityMap},
    entity::EntityKind,
    types::Id,
};
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

///
/// Handle
///
/// The owning reference callers hold to a cached entity. Cloning a
/// handle shares the entry and increments the external-holder count;
/// dropping the last external handle to an entry evicts it from the
/// owning `IdentityMap`.
///
/// The map itself holds one strong reference to the entry (its
/// bookkeeping reference, see `IdentityMap`), so the `Rc` strong count
/// observed from inside `Drop` is `external holders + 1`. When a
/// handle's destructor sees that count fall to `2` — this handle plus
/// the map's own reference — it is the last external holder and erases
/// the entry.
///

pub struct Handle<K: EntityKind> {
    entry: Cell<K>,
    map: Rc<RefCell<IdentityMap<K>>>,
}

impl<K: EntityKind> Handle<K> {
    pub(crate) fn new(entry: Cell<K>, map: Rc<RefCell<IdentityMap<K>>>) -> Self {
        Self { entry, map }
    }

    #[must_use]
    pub fn id(&self) -> Id<K> {
        self.entry.borrow().id()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.entry.borrow().is_valid()
    }

    pub fn borrow(&self) -> Ref<'_, K> {
        self.entry.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, K> {
        self.entry.borrow_mut()
    }

    /// True if `self` and `other` share the same cached entry.
    #[must_use]
    pub fn same_entry(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entry, &other.entry)
    }

}

impl<K: EntityKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        Self {
            entry: Rc::clone(&self.entry),
            map: Rc::clone(&self.map),
        }
    }
}

impl<K: EntityKind> Drop for Handle<K> {
    fn drop(&mut self) {
        // At this point `self.entry` is still a live strong reference
        // (the automatic field drop has not run yet), so a count of 2
        // means: this handle, plus the map's own bookkeeping reference.
        // Anything higher means another external handle survives us.
        if Rc::strong_count(&self.entry) == 2 {
            self.map.borrow_mut().erase(&self.entry);
        }
    }
}
