//! Persistence: snapshot JSON documents, zip archives and lock files

pub mod archive;
pub mod lock;
pub mod snapshot;
