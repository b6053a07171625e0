//! API handlers, one module per resource family.

pub mod auth;
pub mod devices;
pub mod health;
pub mod root;
