pub mod admin;
pub mod geo;

pub use admin::{AdminService, admin_routes};
pub use geo::{GeoDebugService, debug_routes};
