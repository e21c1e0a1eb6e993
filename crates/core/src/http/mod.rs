//! HTTP outcome handling independent of any transport

pub mod classifier;

pub use classifier::{classify, classify_transport, is_retryable_status, ResponseMeta};
