//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能，支持：
//! - MaxMind GeoLite2 本地数据库（内存映射 + 热重载）
//! - 多 resolver 顺序查询链

mod chain;
mod maxmind;
mod provider;

pub use chain::ResolverChain;
pub use maxmind::MaxMindProvider;
pub use provider::{Coordinates, GeoIpLookup, GeoIpRegistry, LookupResult};
