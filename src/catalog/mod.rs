//! Service catalog: priced items grouped into categories

mod item;
mod category;
pub mod loader;

pub use item::{Item, Timing};
pub use category::{Catalog, Category, ItemOverlap};
pub use loader::{load_categories, load_categories_from_reader};
