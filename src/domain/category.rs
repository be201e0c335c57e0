use crate::{db::Db, entity::EntityKind, error::CacheError, store::Store, types::Id};

///
/// Category
///
/// Root entity kind: no foreign key, no parent. Groups descriptions
/// together (a pantry shelf, a drawer, whatever grouping an application
/// wants).
///

#[derive(Debug, Clone)]
pub struct Category {
    id: Id<Category>,
    valid: bool,
    pub name: String,
    pub image: Option<String>,
    pub archived: bool,
}

/// Fields supplied by a caller constructing a new, not-yet-persisted
/// category.
#[derive(Debug, Clone)]
pub struct CategorySchema {
    pub name: String,
    pub image: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub archived: Option<bool>,
}

impl Category {
    #[must_use]
    pub fn new(schema: CategorySchema) -> Self {
        Self {
            id: Id::UNINIT,
            valid: true,
            name: schema.name,
            image: schema.image,
            archived: schema.archived,
        }
    }
}

impl EntityKind for Category {
    type Row = CategoryRow;
    type Filter = CategoryFilter;

    const NAME: &'static str = "Category";

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
        CategoryRow {
            id: self.id.get(),
            name: self.name.clone(),
            image: self.image.clone(),
            archived: self.archived,
        }
    }

    fn row_id(row: &Self::Row) -> i64 {
        row.id
    }

    fn hydrate_one<S: Store>(row: Self::Row, _db: &Db<S>) -> Result<Self, CacheError> {
        Ok(Self {
            id: Id::new(row.id),
            valid: true,
            name: row.name,
            image: row.image,
            archived: row.archived,
        })
    }
}
