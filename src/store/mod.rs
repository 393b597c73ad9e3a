pub mod catalog;
pub mod gateway;

pub use catalog::CatalogStore;
pub use gateway::{InMemoryGateway, JsonFileGateway, MovieGateway};
