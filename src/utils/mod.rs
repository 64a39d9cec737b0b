pub mod ip;

pub use ip::{CidrNetwork, extract_real_ip, is_trusted, parse_trusted_proxies};
