pub mod geo;

pub use geo::GeoMiddleware;
