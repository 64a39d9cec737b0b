use serde::{Deserialize, Serialize};

/// 应用静态配置
///
/// 包含：
/// - server: 服务器地址、端口、worker 数量
/// - logging: 日志配置
/// - geoip: GeoIP 中间件与 resolver 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：GEOGATE，分隔符：__
    /// 示例：GEOGATE__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 GEOGATE，分隔符 __
            .add_source(
                Environment::with_prefix("GEOGATE")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<AppConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.geoip.resolvers = vec![ResolverConfig {
            name: "city".to_string(),
            database_dir: "/var/lib/geoip".to_string(),
            database_file: "GeoLite2-City.mmdb".to_string(),
        }];
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法，如 "info" 或 "geogate=debug,info"）
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 输出格式："full" 或 "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// 日志文件路径；为空或未设置时输出到控制台
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            enable_rotation: true,
            max_backups: default_max_backups(),
        }
    }
}

/// GeoIP 中间件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// 读取客户端 IP 的请求头（如 x-real-ip、x-forwarded-for）
    #[serde(default = "default_ip_header")]
    pub ip_header: String,
    /// 递归回溯可信代理（类似 nginx real_ip_recursive）
    #[serde(default)]
    pub recursive: bool,
    /// 可信代理网络列表（CIDR 或单个地址）
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
    /// resolver 列表，按顺序组成查询链，第一个命中的结果生效
    #[serde(default)]
    pub resolvers: Vec<ResolverConfig>,
    #[serde(default)]
    pub context: ContextConfig,
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            ip_header: default_ip_header(),
            recursive: false,
            trusted_proxies: Vec::new(),
            resolvers: Vec::new(),
            context: ContextConfig::default(),
        }
    }
}

/// 单个 MaxMind resolver 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// resolver 名称，用于日志和 reload 接口定位
    pub name: String,
    pub database_dir: String,
    pub database_file: String,
}

/// 请求上下文键名配置
///
/// 中间件在解析成功后，按这些键名把地理信息写入请求上下文。
/// 键名可单独改名；设置为空字符串时该字段不写入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_lookup_result_key")]
    pub lookup_result_key: String,
    #[serde(default = "default_country_code_key")]
    pub country_code_key: String,
    #[serde(default = "default_country_name_key")]
    pub country_name_key: String,
    #[serde(default = "default_city_name_key")]
    pub city_name_key: String,
    #[serde(default = "default_time_zone_key")]
    pub time_zone_key: String,
    #[serde(default = "default_coordinates_key")]
    pub coordinates_key: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            lookup_result_key: default_lookup_result_key(),
            country_code_key: default_country_code_key(),
            country_name_key: default_country_name_key(),
            city_name_key: default_city_name_key(),
            time_zone_key: default_time_zone_key(),
            coordinates_key: default_coordinates_key(),
        }
    }
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_backups() -> u32 {
    7
}

fn default_ip_header() -> String {
    "x-real-ip".to_string()
}

fn default_lookup_result_key() -> String {
    "lookup_result".to_string()
}

fn default_country_code_key() -> String {
    "country_code".to_string()
}

fn default_country_name_key() -> String {
    "country_name".to_string()
}

fn default_city_name_key() -> String {
    "city_name".to_string()
}

fn default_time_zone_key() -> String {
    "time_zone".to_string()
}

fn default_coordinates_key() -> String {
    "coordinates".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.geoip.ip_header, "x-real-ip");
        assert!(!config.geoip.recursive);
        assert!(config.geoip.trusted_proxies.is_empty());
        assert!(config.geoip.resolvers.is_empty());
        assert_eq!(config.geoip.context.lookup_result_key, "lookup_result");
        assert_eq!(config.geoip.context.coordinates_key, "coordinates");
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = AppConfig::generate_sample_config();
        let parsed: AppConfig = toml::from_str(&sample).expect("Sample config should parse");
        assert_eq!(parsed.geoip.resolvers.len(), 1);
        assert_eq!(parsed.geoip.resolvers[0].name, "city");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
[geoip]
ip_header = "x-forwarded-for"
recursive = true
trusted_proxies = ["10.0.0.0/8"]

[[geoip.resolvers]]
name = "city"
database_dir = "/tmp"
database_file = "GeoLite2-City.mmdb"
"#,
        )
        .unwrap();
        assert_eq!(parsed.geoip.ip_header, "x-forwarded-for");
        assert!(parsed.geoip.recursive);
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.geoip.context.country_code_key, "country_code");
    }
}
