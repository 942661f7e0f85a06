pub mod client;
pub mod wire;

pub use client::{CatalogClient, MangaDexClient, DEFAULT_API_URL};

#[cfg(test)]
pub use client::MockCatalogClient;
