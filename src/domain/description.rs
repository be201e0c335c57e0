use crate::{
    db::Db,
    domain::category::Category,
    entity::EntityKind,
    error::CacheError,
    handle::Handle,
    store::Store,
    types::Id,
};
use std::collections::HashMap;

///
/// Description
///
/// Child of `Category`. Holds its foreign key (`fk_id`) alongside a live
/// `Handle<Category>` so callers can walk to the parent without a
/// further fetch, while `sync_before_commit` keeps the foreign key
/// consistent with whatever parent the handle currently points at.
///

#[derive(Clone)]
pub struct Description {
    id: Id<Description>,
    valid: bool,
    fk_id: Id<Category>,
    parent: Handle<Category>,
    pub name: String,
    pub barcode: Option<String>,
    pub days_valid_suggestion: u32,
    pub image: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone)]
pub struct DescriptionSchema {
    pub name: String,
    pub barcode: Option<String>,
    pub days_valid_suggestion: u32,
    pub image: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone)]
pub struct DescriptionRow {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub barcode: Option<String>,
    pub days_valid_suggestion: u32,
    pub image: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DescriptionFilter {
    pub category_id: Option<i64>,
    pub barcode: Option<String>,
}

impl Description {
    #[must_use]
    pub fn new(parent: &Handle<Category>, schema: DescriptionSchema) -> Self {
        Self {
            id: Id::UNINIT,
            valid: true,
            fk_id: parent.id(),
            parent: parent.clone(),
            name: schema.name,
            barcode: schema.barcode,
            days_valid_suggestion: schema.days_valid_suggestion,
            image: schema.image,
            archived: schema.archived,
        }
    }

    /// The live handle to this description's category.
    #[must_use]
    pub fn category(&self) -> &Handle<Category> {
        &self.parent
    }

    /// Repoints this description at a different category. Takes effect
    /// in the store on the next `commit`.
    pub fn set_category(&mut self, parent: &Handle<Category>) {
        self.parent = parent.clone();
    }
}

impl EntityKind for Description {
    type Row = DescriptionRow;
    type Filter = DescriptionFilter;

    const NAME: &'static str = "Description";

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
        DescriptionRow {
            id: self.id.get(),
            category_id: self.fk_id.get(),
            name: self.name.clone(),
            barcode: self.barcode.clone(),
            days_valid_suggestion: self.days_valid_suggestion,
            image: self.image.clone(),
            archived: self.archived,
        }
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn sync_before_commit(&mut self) {
        self.fk_id = self.parent.id();
    }

    fn hydrate_one<S: Store>(row: Self::Row, db: &Db<S>) -> Result<Self, CacheError> {
        let fk_id = Id::new(row.category_id);
        let parent = db.retrieve::<Category>(fk_id)?;

        Ok(Self {
            id: Id::new(row.id),
            valid: true,
            fk_id,
            parent,
            name: row.name,
            barcode: row.barcode,
            days_valid_suggestion: row.days_valid_suggestion,
            image: row.image,
            archived: row.archived,
        })
    }

    fn hydrate_many<S: Store>(rows: Vec<Self::Row>, db: &Db<S>) -> Result<Vec<Self>, CacheError> {
        let mut parent_ids: Vec<Id<Category>> = rows.iter().map(|row| Id::new(row.category_id)).collect();
        parent_ids.sort_by_key(Id::get);
        parent_ids.dedup();

        let parents = db.retrieve_many::<Category>(&parent_ids)?;
        let by_id: HashMap<i64, Handle<Category>> =
            parents.into_iter().map(|handle| (handle.id().get(), handle)).collect();

        rows.into_iter()
            .map(|row| {
                let fk_id = Id::new(row.category_id);
                let parent = by_id
                    .get(&row.category_id)
                    .cloned()
                    .ok_or_else(|| CacheError::DanglingForeignKey {
                        entity: Self::NAME,
                        parent: Category::NAME,
                        fk_id: row.category_id,
                    })?;
                Ok(Self {
                    id: Id::new(row.id),
                    valid: true,
                    fk_id,
                    parent,
                    name: row.name,
                    barcode: row.barcode,
                    days_valid_suggestion: row.days_valid_suggestion,
                    image: row.image,
                    archived: row.archived,
                })
            })
            .collect()
    }
}
