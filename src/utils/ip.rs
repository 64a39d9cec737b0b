//! IP 地址处理工具
//!
//! 提供统一的客户端 IP 提取功能，支持：
//! - 可信代理配置（trusted_proxies）
//! - CIDR 匹配（IPv4 / IPv6）
//! - X-Forwarded-For 递归回溯（类似 nginx real_ip_recursive）

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::errors::{GeogateError, Result};

/// 可信代理网络前缀
///
/// 不变量：prefix_len 不超过地址族位宽（IPv4 为 32，IPv6 为 128），
/// 由 [`CidrNetwork::parse`] 在构造时保证。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CidrNetwork {
    V4 { base: Ipv4Addr, prefix_len: u8 },
    V6 { base: Ipv6Addr, prefix_len: u8 },
}

impl CidrNetwork {
    /// 解析单条 CIDR 配置
    ///
    /// 先尝试 IPv4，失败后尝试 IPv6；裸地址（无 `/len`）按主机前缀处理
    /// （/32 或 /128）。两者都失败时返回包含原始字符串的错误。
    pub fn parse(cidr: &str) -> Result<Self> {
        let (addr_part, prefix_part) = match cidr.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (cidr, None),
        };

        if let Ok(base) = addr_part.parse::<Ipv4Addr>() {
            let prefix_len = match prefix_part {
                Some(p) => p
                    .parse::<u8>()
                    .ok()
                    .filter(|len| *len <= 32)
                    .ok_or_else(|| {
                        GeogateError::invalid_cidr(format!("Invalid CIDR notation: {}", cidr))
                    })?,
                None => 32,
            };
            return Ok(CidrNetwork::V4 { base, prefix_len });
        }

        if let Ok(base) = addr_part.parse::<Ipv6Addr>() {
            let prefix_len = match prefix_part {
                Some(p) => p
                    .parse::<u8>()
                    .ok()
                    .filter(|len| *len <= 128)
                    .ok_or_else(|| {
                        GeogateError::invalid_cidr(format!("Invalid CIDR notation: {}", cidr))
                    })?,
                None => 128,
            };
            return Ok(CidrNetwork::V6 { base, prefix_len });
        }

        Err(GeogateError::invalid_cidr(format!(
            "Invalid CIDR notation: {}",
            cidr
        )))
    }

    /// 判断地址是否属于本网络（仅同地址族比较）
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (CidrNetwork::V4 { base, prefix_len }, IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - *prefix_len as u32).unwrap_or(0);
                let ip_bits = u32::from_be_bytes(ip.octets());
                let net_bits = u32::from_be_bytes(base.octets());
                (ip_bits & mask) == (net_bits & mask)
            }
            (CidrNetwork::V6 { base, prefix_len }, IpAddr::V6(ip)) => {
                let mask = u128::MAX
                    .checked_shl(128 - *prefix_len as u32)
                    .unwrap_or(0);
                let ip_bits = u128::from_be_bytes(ip.octets());
                let net_bits = u128::from_be_bytes(base.octets());
                (ip_bits & mask) == (net_bits & mask)
            }
            _ => false, // IPv4 vs IPv6 不匹配
        }
    }
}

/// 解析可信代理网络列表（fail-fast：任意一条非法即整体失败）
///
/// 空列表合法，表示不信任任何代理。
pub fn parse_trusted_proxies(cidrs: &[String]) -> Result<Vec<CidrNetwork>> {
    cidrs.iter().map(|cidr| CidrNetwork::parse(cidr)).collect()
}

/// 检查地址字符串是否落在可信代理网络中
///
/// 先尝试解析为 SocketAddr（支持 ip:port），失败再尝试纯 IpAddr；
/// 解析失败的候选地址视为不可信，返回 false 而非报错。
pub fn is_trusted(candidate: &str, trusted_proxies: &[CidrNetwork]) -> bool {
    let ip_addr = if let Ok(socket_addr) = candidate.parse::<SocketAddr>() {
        socket_addr.ip()
    } else if let Ok(ip_addr) = candidate.parse::<IpAddr>() {
        ip_addr
    } else {
        return false;
    };

    trusted_proxies.iter().any(|net| net.contains(&ip_addr))
}

/// 从转发头中提取真实客户端 IP
///
/// 返回空字符串表示无法确定客户端 IP。
///
/// 策略：
/// 1. 按逗号拆分，去除空白，丢弃空 token；全空则返回空
/// 2. 非递归模式或可信代理为空 → 取最左侧 token（最接近原始客户端）
/// 3. 递归模式：从最右侧向左回溯，跳过落在可信网络中的 hop，
///    第一个不可信的 hop 即为结果
/// 4. 所有 hop 都可信 → 回退到最左侧 token
pub fn extract_real_ip(
    header_value: &str,
    trusted_proxies: &[CidrNetwork],
    recursive: bool,
) -> String {
    let tokens: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() {
        return String::new();
    }

    if !recursive || trusted_proxies.is_empty() {
        return tokens[0].to_string();
    }

    for token in tokens.iter().rev() {
        if !is_trusted(token, trusted_proxies) {
            return token.to_string();
        }
    }

    // 整条链路都是已知代理，退而返回最早的 hop
    tokens[0].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn networks(cidrs: &[&str]) -> Vec<CidrNetwork> {
        let strings: Vec<String> = cidrs.iter().map(|s| s.to_string()).collect();
        parse_trusted_proxies(&strings).unwrap()
    }

    #[test]
    fn test_parse_cidr_v4() {
        let net = CidrNetwork::parse("192.168.1.0/24").unwrap();
        assert_eq!(
            net,
            CidrNetwork::V4 {
                base: "192.168.1.0".parse().unwrap(),
                prefix_len: 24
            }
        );
    }

    #[test]
    fn test_parse_cidr_v6() {
        let net = CidrNetwork::parse("2001:db8::/32").unwrap();
        assert_eq!(
            net,
            CidrNetwork::V6 {
                base: "2001:db8::".parse().unwrap(),
                prefix_len: 32
            }
        );
    }

    #[test]
    fn test_parse_bare_address_as_host_prefix() {
        assert_eq!(
            CidrNetwork::parse("10.0.0.1").unwrap(),
            CidrNetwork::V4 {
                base: "10.0.0.1".parse().unwrap(),
                prefix_len: 32
            }
        );
        assert_eq!(
            CidrNetwork::parse("::1").unwrap(),
            CidrNetwork::V6 {
                base: "::1".parse().unwrap(),
                prefix_len: 128
            }
        );
    }

    #[test]
    fn test_parse_invalid_cidr() {
        assert!(CidrNetwork::parse("not-a-cidr").is_err());
        assert!(CidrNetwork::parse("10.0.0.0/33").is_err());
        assert!(CidrNetwork::parse("2001:db8::/129").is_err());
        assert!(CidrNetwork::parse("10.0.0.0/abc").is_err());
    }

    #[test]
    fn test_parse_trusted_proxies_fail_fast() {
        // 单条非法即整体失败，错误信息包含违规字符串
        let input = vec!["10.0.0.0/8".to_string(), "not-a-cidr".to_string()];
        let err = parse_trusted_proxies(&input).unwrap_err();
        assert!(err.message().contains("not-a-cidr"));
    }

    #[test]
    fn test_parse_trusted_proxies_empty_is_valid() {
        assert!(parse_trusted_proxies(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_contains_v4() {
        let net = CidrNetwork::parse("192.168.1.0/24").unwrap();
        assert!(net.contains(&"192.168.1.100".parse().unwrap()));
        assert!(!net.contains(&"192.168.2.1".parse().unwrap()));
        // 地址族不匹配
        assert!(!net.contains(&"2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_contains_v6() {
        let net = CidrNetwork::parse("2001:db8::/32").unwrap();
        assert!(net.contains(&"2001:db8::1".parse().unwrap()));
        assert!(!net.contains(&"2001:db9::1".parse().unwrap()));
        assert!(!net.contains(&"192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_contains_zero_prefix_matches_all() {
        let net = CidrNetwork::parse("0.0.0.0/0").unwrap();
        assert!(net.contains(&"8.8.8.8".parse().unwrap()));
        assert!(net.contains(&"192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_is_trusted_with_port() {
        let nets = networks(&["10.0.0.0/8"]);
        assert!(is_trusted("10.1.2.3", &nets));
        assert!(is_trusted("10.1.2.3:8080", &nets));
        assert!(!is_trusted("8.8.8.8", &nets));
        assert!(!is_trusted("garbage", &nets));
    }

    #[test]
    fn test_extract_non_recursive_returns_leftmost() {
        let nets = networks(&["10.0.0.0/8"]);
        assert_eq!(
            extract_real_ip("203.0.113.5, 10.0.0.2, 10.0.0.1", &nets, false),
            "203.0.113.5"
        );
        assert_eq!(
            extract_real_ip(" 10.0.0.2 , 203.0.113.5", &nets, false),
            "10.0.0.2"
        );
    }

    #[test]
    fn test_extract_empty_header() {
        let nets = networks(&["10.0.0.0/8"]);
        assert_eq!(extract_real_ip("", &nets, true), "");
        assert_eq!(extract_real_ip(" , , ", &nets, true), "");
        assert_eq!(extract_real_ip("", &[], false), "");
    }

    #[test]
    fn test_extract_recursive_skips_trusted_hops() {
        let nets = networks(&["10.0.0.0/8"]);
        assert_eq!(
            extract_real_ip("203.0.113.5, 10.0.0.2, 10.0.0.1", &nets, true),
            "203.0.113.5"
        );
    }

    #[test]
    fn test_extract_recursive_empty_trusted_set_uses_leftmost() {
        assert_eq!(
            extract_real_ip("203.0.113.5, 10.0.0.2, 10.0.0.1", &[], true),
            "203.0.113.5"
        );
    }

    #[test]
    fn test_extract_recursive_all_trusted_falls_back_to_leftmost() {
        let nets = networks(&["10.0.0.0/8"]);
        assert_eq!(
            extract_real_ip("10.0.0.5, 10.0.0.2", &nets, true),
            "10.0.0.5"
        );
    }

    #[test]
    fn test_extract_recursive_stops_at_first_untrusted() {
        let nets = networks(&["10.0.0.0/8", "172.16.0.0/12"]);
        // 从右向左：172.16.0.1 可信，198.51.100.7 不可信 → 选中
        assert_eq!(
            extract_real_ip("203.0.113.5, 198.51.100.7, 172.16.0.1", &nets, true),
            "198.51.100.7"
        );
    }

    #[test]
    fn test_extract_recursive_unparsable_token_is_untrusted() {
        let nets = networks(&["10.0.0.0/8"]);
        // "unknown" 无法解析 → 不可信 → 被选中
        assert_eq!(
            extract_real_ip("203.0.113.5, unknown, 10.0.0.1", &nets, true),
            "unknown"
        );
    }

    #[test]
    fn test_extract_recursive_ipv6_trusted() {
        let nets = networks(&["2001:db8::/32"]);
        assert_eq!(
            extract_real_ip("203.0.113.5, 2001:db8::1", &nets, true),
            "203.0.113.5"
        );
    }
}
