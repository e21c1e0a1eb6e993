//! HTTP transport and the authenticated request pipeline

pub mod client;
pub mod executor;

pub use client::{should_retry_error, HttpClient, HttpClientBuilder, HttpReply};
pub use executor::RequestExecutor;
