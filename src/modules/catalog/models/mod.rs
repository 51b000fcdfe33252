//! Persisted catalog records. An author owns many books; book titles are
//! unique across the whole catalog, not per author.

pub mod author;
pub mod book;
