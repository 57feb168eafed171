pub mod model;
pub mod slot;
pub mod store;
