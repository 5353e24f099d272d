pub mod catalog;
pub mod index;
pub mod rbtree;

pub use catalog::{Catalog, CatalogError, Problem};
pub use index::DifficultyIndex;
pub use rbtree::RbTree;
