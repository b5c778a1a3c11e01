pub mod document;
pub mod sqlite_store;
