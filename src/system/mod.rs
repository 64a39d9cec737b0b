//! System-level modules
//!
//! Platform and process concerns that are not part of the request path:
//! - Logging bootstrap

pub mod logging;
