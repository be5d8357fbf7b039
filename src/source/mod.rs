//! # Message Source
//!
//! The fetching half of the viewer: one request to the relay endpoint, then
//! the pure transformation in `core::message`.

pub mod http;
pub mod loader;
pub mod provider;

pub use http::HttpMessageSource;
pub use loader::load;
pub use provider::{FetchError, MessageSource};
