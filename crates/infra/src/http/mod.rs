//! HTTP transport: client, request executor and token providers

pub mod auth;
pub mod client;
pub mod executor;

pub use auth::{AccessTokenProvider, NoTokenProvider, StaticTokenProvider};
pub use client::{HttpClient, HttpClientBuilder};
pub use executor::HttpRequestExecutor;
