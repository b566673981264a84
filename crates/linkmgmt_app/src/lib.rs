//! Terminal client for the link management service.
pub mod platform;
