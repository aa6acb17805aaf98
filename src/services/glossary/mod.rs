pub mod hash;
pub mod model;
pub mod store;
