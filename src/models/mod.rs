//! Model selection and caching

pub mod cache;
pub mod selector;

pub use cache::ModelCache;
pub use selector::{ModelSelector, SelectionPolicy};
