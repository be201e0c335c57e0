//! Sample entity kinds (`Category` → `Description` → `Instance`) used
//! to exercise the cache end to end. Not part of the cache's public
//! contract; an application wires up its own kinds the same way.

mod category;
mod description;
mod instance;

pub use category::{Category, CategoryFilter, CategoryRow, CategorySchema};
pub use description::{Description, DescriptionFilter, DescriptionRow, DescriptionSchema};
pub use instance::{Instance, InstanceFilter, InstanceRow, InstanceSchema};
