pub mod entity;

pub use entity::{LibraryStats, RemoteStats};
