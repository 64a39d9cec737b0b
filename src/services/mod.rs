//! Service layer for business logic
//!
//! This module provides unified business logic that can be shared between
//! different interfaces (HTTP middleware, admin API, debug endpoints).

pub mod geoip;

pub use geoip::{
    Coordinates, GeoIpLookup, GeoIpRegistry, LookupResult, MaxMindProvider, ResolverChain,
};
