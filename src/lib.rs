//! unitrack - client library for the universities backend
//!
//! - [`api`]: typed REST client with explicit per-request credentials
//! - [`session`]: login state and the persisted token
//! - [`controller`]: list/filter/pagination, form and dashboard state
//! - [`render`]: plain-text views of controller state

pub mod api;
pub mod config;
pub mod controller;
pub mod logging;
pub mod render;
pub mod session;
pub mod storage;
pub mod util;
