//! Core services: snapshot storage, editing, search, and filesystem helpers

pub mod backup;
pub mod catalogue;
pub mod diff;
pub mod format;
pub mod fsops;
pub mod manager;
pub mod search;
pub mod size;
pub mod sort;
