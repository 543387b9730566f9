pub mod assets;
pub mod client;
pub mod models;

pub use assets::AssetSource;
pub use client::BackendClient;
