//! Geogate - GeoIP resolution middleware for Actix Web
//!
//! This library resolves the geographic origin of an inbound request from
//! its client IP address and publishes the result into the request
//! extensions for downstream handlers, while tolerating proxy chains and
//! allowing the underlying MaxMind database to be reloaded without
//! interrupting concurrent lookups.
//!
//! # Architecture
//! - `utils`: trusted-proxy CIDR matching and forwarded-header IP extraction
//! - `services`: the `GeoIpLookup` capability, the MaxMind-backed resolver
//!   with hot reload, the ordered resolver chain, and the resolver registry
//! - `api`: the Actix middleware, the per-request geo context, and the
//!   debug/admin HTTP services
//! - `config`: configuration structs and layered loading
//! - `system`: logging bootstrap

pub mod api;
pub mod config;
pub mod errors;
pub mod services;
pub mod system;
pub mod utils;
