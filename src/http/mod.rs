//! HTTP fetching for the webguard scanner

pub mod client;
pub mod cookies;
pub use client::HttpClient;
