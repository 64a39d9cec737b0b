//! GeoIP 查询抽象层
//!
//! 统一的 GeoIP 查询接口：
//! - [`GeoIpLookup`]: 所有 resolver 实现的公共 trait
//! - [`GeoIpRegistry`]: 按配置构建的 resolver 集合，
//!   查询链按配置顺序排列，命名索引用于管理接口定位实例

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::chain::ResolverChain;
use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;
use crate::errors::{GeogateError, Result};

/// 经纬度坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// 一次成功查询得到的地理信息
///
/// country_code / country_name 在结果存在时必定存在；
/// 其余字段独立可选，数据集缺失时整个字段省略（序列化时不输出）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country_code: String,
    /// 英文国家名称
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// GeoIP 查询 trait
///
/// 实现约定：
/// - 空地址、未收录地址、内部错误一律返回 None（warn 日志），不抛错
/// - 必须支持任意并发调用
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    fn lookup(&self, ip: &str) -> Option<LookupResult>;

    /// resolver 实例名称（用于日志和 reload 定位）
    fn name(&self) -> &str;
}

/// 按配置构建的 resolver 集合
pub struct GeoIpRegistry {
    chain: Arc<ResolverChain>,
    named: HashMap<String, Arc<MaxMindProvider>>,
}

impl GeoIpRegistry {
    /// 根据 GeoIpConfig 构建所有 resolver
    ///
    /// 任一数据库打开失败、resolver 名称重复、或列表为空，
    /// 都视为启动期配置错误。
    pub fn from_config(config: &GeoIpConfig) -> Result<Self> {
        let mut named: HashMap<String, Arc<MaxMindProvider>> = HashMap::new();
        let mut ordered: Vec<Arc<dyn GeoIpLookup>> = Vec::with_capacity(config.resolvers.len());

        for resolver_config in &config.resolvers {
            if named.contains_key(&resolver_config.name) {
                return Err(GeogateError::config(format!(
                    "Duplicate resolver name: {}",
                    resolver_config.name
                )));
            }
            let provider = Arc::new(MaxMindProvider::open(
                &resolver_config.name,
                &resolver_config.database_dir,
                &resolver_config.database_file,
            )?);
            named.insert(resolver_config.name.clone(), provider.clone());
            ordered.push(provider as Arc<dyn GeoIpLookup>);
        }

        let chain = Arc::new(ResolverChain::new(ordered)?);
        info!("GeoIP registry initialized with {} resolver(s)", chain.len());

        Ok(Self { chain, named })
    }

    /// 查询链（按配置顺序）
    pub fn chain(&self) -> Arc<ResolverChain> {
        Arc::clone(&self.chain)
    }

    /// 按名称定位 resolver（reload 接口使用）
    pub fn get(&self, name: &str) -> Option<Arc<MaxMindProvider>> {
        self.named.get(name).cloned()
    }
}
