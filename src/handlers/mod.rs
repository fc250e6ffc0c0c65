//! # HTTP Request Handlers
//!
//! - **Health Check** (`health_check`) - Application health monitoring

mod health_check;

pub use health_check::*;
