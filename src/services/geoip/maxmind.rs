//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 MaxMind mmdb 文件（内存映射）进行 IP 地理位置查询，
//! 支持运行中热重载数据库镜像。

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use maxminddb::{Mmap, Reader, geoip2};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::provider::{Coordinates, GeoIpLookup, LookupResult};
use crate::errors::{GeogateError, Result};

/// MaxMind GeoIP resolver
///
/// 活动镜像放在 `ArcSwap` 后面：查询方 `load` 得到的引用在整个查询期间
/// 固定指向同一镜像，reload 的 `store` 是原子指针替换，旧镜像在最后一个
/// 在途查询结束后才被关闭。查询永远看到完整的旧镜像或完整的新镜像。
pub struct MaxMindProvider {
    name: String,
    database_path: PathBuf,
    reader: ArcSwap<Reader<Mmap>>,
    /// 串行化并发 reload；查询路径不经过此锁
    reload_lock: Mutex<()>,
}

impl MaxMindProvider {
    /// 打开数据库并创建 resolver
    ///
    /// 打开失败是启动期错误，构造直接失败。
    pub fn open(name: &str, database_dir: &str, database_file: &str) -> Result<Self> {
        let database_path = Path::new(database_dir).join(database_file);
        let reader = unsafe { Reader::open_mmap(&database_path) }.map_err(|e| {
            GeogateError::database_open(format!(
                "Failed to open database file {}: {}",
                database_path.display(),
                e
            ))
        })?;

        info!(
            "MaxMind database \"{}\" opened from {}",
            name,
            database_path.display()
        );

        Ok(Self {
            name: name.to_string(),
            database_path,
            reader: ArcSwap::from_pointee(reader),
            reload_lock: Mutex::new(()),
        })
    }

    /// 热重载数据库镜像
    ///
    /// 先在原路径上打开新镜像，成功后才原子替换活动引用；
    /// 打开失败时保留旧镜像继续服务（reload 失败绝不影响在线查询）。
    /// 重复调用幂等，重叠的 reload 串行执行。
    pub fn reload(&self) -> Result<()> {
        let _guard = self.reload_lock.lock();

        match unsafe { Reader::open_mmap(&self.database_path) } {
            Ok(new_reader) => {
                self.reader.store(Arc::new(new_reader));
                info!(
                    "MaxMind database \"{}\" reloaded from {}",
                    self.name,
                    self.database_path.display()
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to reload MaxMind database \"{}\" from {}: {}",
                    self.name,
                    self.database_path.display(),
                    e
                );
                Err(GeogateError::database_open(format!(
                    "Failed to open database file {}: {}",
                    self.database_path.display(),
                    e
                )))
            }
        }
    }
}

impl GeoIpLookup for MaxMindProvider {
    fn lookup(&self, ip: &str) -> Option<LookupResult> {
        if ip.is_empty() {
            return None;
        }

        let ip_addr: IpAddr = match ip.parse() {
            Ok(addr) => addr,
            Err(_) => {
                warn!("GeoIP lookup skipped, unparsable address: {}", ip);
                return None;
            }
        };

        // load 固定住当前镜像，本次查询期间不受 reload 影响
        let reader = self.reader.load();

        let record = match reader.lookup(ip_addr) {
            Ok(record) => record,
            Err(e) => {
                warn!("GeoIP lookup failed for {}: {}", ip, e);
                return None;
            }
        };

        let city: geoip2::City = match record.decode() {
            Ok(Some(city)) => city,
            Ok(None) => {
                warn!("GeoIP lookup for {}: address not found", ip);
                return None;
            }
            Err(e) => {
                warn!("GeoIP record decode failed for {}: {}", ip, e);
                return None;
            }
        };

        // country_code / country_name 缺失时整条记录不可用
        let (Some(country_code), Some(country_name)) =
            (city.country.iso_code, city.country.names.english)
        else {
            warn!("GeoIP record for {} lacks country data", ip);
            return None;
        };

        let coordinates = match (city.location.latitude, city.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Some(LookupResult {
            country_code: country_code.to_string(),
            country_name: country_name.to_string(),
            city_name: city.city.names.english.map(String::from),
            time_zone: city.location.time_zone.map(String::from),
            coordinates,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
