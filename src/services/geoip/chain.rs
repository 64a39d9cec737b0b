//! Resolver 查询链
//!
//! 按配置顺序依次尝试各 resolver，返回第一个命中的结果，
//! 不合并、不聚合多个 resolver 的部分结果。

use std::sync::Arc;

use tracing::{info, warn};

use super::provider::{GeoIpLookup, LookupResult};
use crate::errors::{GeogateError, Result};

/// 有序 resolver 链
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn GeoIpLookup>>,
}

impl ResolverChain {
    /// 空链是配置错误，不是运行期 miss
    pub fn new(resolvers: Vec<Arc<dyn GeoIpLookup>>) -> Result<Self> {
        if resolvers.is_empty() {
            return Err(GeogateError::empty_resolver_chain(
                "No geoip resolvers configured",
            ));
        }
        Ok(Self { resolvers })
    }

    /// 依次查询，返回第一个命中结果；全部 miss 返回 None
    pub fn lookup(&self, ip: &str) -> Option<LookupResult> {
        for (index, resolver) in self.resolvers.iter().enumerate() {
            if let Some(result) = resolver.lookup(ip) {
                info!(
                    "Resolved IP {} to {} via resolver #{} ({})",
                    ip,
                    result.country_code,
                    index,
                    resolver.name()
                );
                return Some(result);
            }
        }
        warn!("Failed to resolve IP: {}", ip);
        None
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
