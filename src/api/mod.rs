//! HTTP Surface
//!
//! REST endpoints exposed upward to route handlers and operators: cache
//! system health and an on-demand cleanup trigger. The smart get/set
//! protocol itself is consumed in-process, not over HTTP.

pub mod rest;
pub mod server;

pub use rest::RestRouter;
pub use server::{ApiServer, ApiServerConfig};
