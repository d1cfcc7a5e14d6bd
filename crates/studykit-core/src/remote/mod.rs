//! Hosted backend access.

mod rest;

pub use rest::RestStore;
