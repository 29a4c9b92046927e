// Interview record storage and CRUD API.

pub mod handlers;
pub mod store;
