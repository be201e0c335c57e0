use crate::{
    datetime::Timestamp,
    db::Db,
    domain::description::Description,
    entity::EntityKind,
    error::CacheError,
    handle::Handle,
    store::Store,
    types::Id,
};
use std::collections::HashMap;

///
/// Instance
///
/// Child of `Description`: one physical, purchased unit of a described
/// product. Leaf of the sample domain's chain (`Category` →
/// `Description` → `Instance`).
///

#[derive(Clone)]
pub struct Instance {
    id: Id<Instance>,
    valid: bool,
    fk_id: Id<Description>,
    parent: Handle<Description>,
    pub purchase_date: Timestamp,
    pub expiration_date: Timestamp,
    pub days_to_expire_when_opened: Option<u32>,
    pub open: bool,
    pub consumed: bool,
}

#[derive(Debug, Clone)]
pub struct InstanceSchema {
    pub purchase_date: Timestamp,
    pub expiration_date: Timestamp,
    pub days_to_expire_when_opened: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct InstanceRow {
    pub id: i64,
    pub description_id: i64,
    pub purchase_date: Timestamp,
    pub expiration_date: Timestamp,
    pub days_to_expire_when_opened: Option<u32>,
    pub open: bool,
    pub consumed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    pub description_id: Option<i64>,
    pub open: Option<bool>,
    pub consumed: Option<bool>,
}

impl Instance {
    #[must_use]
    pub fn new(parent: &Handle<Description>, schema: InstanceSchema) -> Self {
        Self {
            id: Id::UNINIT,
            valid: true,
            fk_id: parent.id(),
            parent: parent.clone(),
            purchase_date: schema.purchase_date,
            expiration_date: schema.expiration_date,
            days_to_expire_when_opened: schema.days_to_expire_when_opened,
            open: false,
            consumed: false,
        }
    }

    #[must_use]
    pub fn description(&self) -> &Handle<Description> {
        &self.parent
    }

    pub fn set_description(&mut self, parent: &Handle<Description>) {
        self.parent = parent.clone();
    }
}

impl EntityKind for Instance {
    type Row = InstanceRow;
    type Filter = InstanceFilter;

    const NAME: &'static str = "Instance";

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) -> Result<(), CacheError> {
        if self.id.is_initialized() {
            return Err(CacheError::IllegalState);
        }
        self.id = id;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }

    fn to_row(&self) -> Self::Row {
        InstanceRow {
            id: self.id.get(),
            description_id: self.fk_id.get(),
            purchase_date: self.purchase_date,
            expiration_date: self.expiration_date,
            days_to_expire_when_opened: self.days_to_expire_when_opened,
            open: self.open,
            consumed: self.consumed,
        }
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn sync_before_commit(&mut self) {
        self.fk_id = self.parent.id();
    }

    fn hydrate_one<S: Store>(row: Self::Row, db: &Db<S>) -> Result<Self, CacheError> {
        let fk_id = Id::new(row.description_id);
        let parent = db.retrieve::<Description>(fk_id)?;

        Ok(Self {
            id: Id::new(row.id),
            valid: true,
            fk_id,
            parent,
            purchase_date: row.purchase_date,
            expiration_date: row.expiration_date,
            days_to_expire_when_opened: row.days_to_expire_when_opened,
            open: row.open,
            consumed: row.consumed,
        })
    }

    fn hydrate_many<S: Store>(rows: Vec<Self::Row>, db: &Db<S>) -> Result<Vec<Self>, CacheError> {
        let mut parent_ids: Vec<Id<Description>> =
            rows.iter().map(|row| Id::new(row.description_id)).collect();
        parent_ids.sort_by_key(Id::get);
        parent_ids.dedup();

        let parents = db.retrieve_many::<Description>(&parent_ids)?;
        let by_id: HashMap<i64, Handle<Description>> =
            parents.into_iter().map(|handle| (handle.id().get(), handle)).collect();

        rows.into_iter()
            .map(|row| {
                let fk_id = Id::new(row.description_id);
                let parent = by_id
                    .get(&row.description_id)
                    .cloned()
                    .ok_or_else(|| CacheError::DanglingForeignKey {
                        entity: Self::NAME,
                        parent: Description::NAME,
                        fk_id: row.description_id,
                    })?;
                Ok(Self {
                    id: Id::new(row.id),
                    valid: true,
                    fk_id,
                    parent,
                    purchase_date: row.purchase_date,
                    expiration_date: row.expiration_date,
                    days_to_expire_when_opened: row.days_to_expire_when_opened,
                    open: row.open,
                    consumed: row.consumed,
                })
            })
            .collect()
    }
}
