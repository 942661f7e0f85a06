pub mod client;
pub mod wire;

pub use client::{LibraryApiClient, LibraryRemote};

#[cfg(test)]
pub use client::MockLibraryRemote;
