//! # Utility Modules
//!
//! - **Constants** (`constant`) - Defaults and environment variable names

pub mod constant;
