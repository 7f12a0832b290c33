//! schoolgate - role-based login and data service for a school LMS
//!
//! Layers, bottom up: a collection-per-role credential store, a query shim
//! that turns SQL-like templates into store calls, the login and token
//! service, and the client-side session model. The HTTP server and CLI sit
//! on top.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod config_validator;
pub mod http_server;
pub mod logging;
pub mod panic_handler;
pub mod query_shim;
pub mod store;
