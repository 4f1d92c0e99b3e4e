pub mod client;
pub mod xml;

pub use client::BggClient;
