mod structs;

pub use structs::{
    AppConfig, ContextConfig, GeoIpConfig, LoggingConfig, ResolverConfig, ServerConfig,
};
