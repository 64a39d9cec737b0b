//! 请求级地理上下文
//!
//! geo 中间件解析成功后写入请求扩展，下游 handler 按配置的键名读取。
//! 随请求创建、随请求销毁，不跨请求缓存。

use std::collections::HashMap;

use serde_json::Value;

use crate::config::ContextConfig;
use crate::services::geoip::LookupResult;

/// 地理上下文：配置键名 → 发布值
#[derive(Debug, Clone, Default)]
pub struct RequestGeoContext {
    values: HashMap<String, Value>,
}

impl RequestGeoContext {
    /// 按配置的键名发布查询结果
    ///
    /// 键名配置为空字符串时该字段不写入；可选字段缺失时对应键不出现
    /// （而不是写入 null）。
    pub fn build(keys: &ContextConfig, result: &LookupResult) -> Self {
        let mut values = HashMap::new();

        if !keys.lookup_result_key.is_empty()
            && let Ok(value) = serde_json::to_value(result)
        {
            values.insert(keys.lookup_result_key.clone(), value);
        }
        if !keys.country_code_key.is_empty() {
            values.insert(
                keys.country_code_key.clone(),
                Value::String(result.country_code.clone()),
            );
        }
        if !keys.country_name_key.is_empty() {
            values.insert(
                keys.country_name_key.clone(),
                Value::String(result.country_name.clone()),
            );
        }
        if !keys.city_name_key.is_empty()
            && let Some(ref city_name) = result.city_name
        {
            values.insert(keys.city_name_key.clone(), Value::String(city_name.clone()));
        }
        if !keys.time_zone_key.is_empty()
            && let Some(ref time_zone) = result.time_zone
        {
            values.insert(keys.time_zone_key.clone(), Value::String(time_zone.clone()));
        }
        if !keys.coordinates_key.is_empty()
            && let Some(ref coordinates) = result.coordinates
            && let Ok(value) = serde_json::to_value(coordinates)
        {
            values.insert(keys.coordinates_key.clone(), value);
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
