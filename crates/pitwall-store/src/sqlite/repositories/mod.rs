//! Stateless repositories over borrowed SQLite connections.

pub mod catalog;
pub mod reading;

pub use catalog::CatalogRepo;
pub use reading::{ReadingRepo, StoredReading};
