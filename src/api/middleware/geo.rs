//! Geo middleware
//!
//! 在请求进入 handler 之前解析客户端地理位置：
//! 读取转发头 → 提取真实客户端 IP → 走 resolver 链查询 →
//! 把结果按配置键名写入请求扩展。
//!
//! 任何一步失败都只会缺少地理上下文，绝不阻断或改变下游请求处理。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::api::context::RequestGeoContext;
use crate::config::{ContextConfig, GeoIpConfig};
use crate::errors::Result;
use crate::services::geoip::ResolverChain;
use crate::utils::ip::{CidrNetwork, extract_real_ip, parse_trusted_proxies};

/// 中间件共享状态，构造时解析完毕，请求路径上不再做配置解析
struct GeoState {
    ip_header: String,
    trusted_proxies: Vec<CidrNetwork>,
    recursive: bool,
    context_keys: ContextConfig,
    chain: Arc<ResolverChain>,
}

/// Geo 中间件工厂
#[derive(Clone)]
pub struct GeoMiddleware {
    state: Arc<GeoState>,
}

impl GeoMiddleware {
    /// 由配置构建中间件
    ///
    /// trusted_proxies 中任意一条 CIDR 非法即构建失败（启动期错误）。
    pub fn new(config: &GeoIpConfig, chain: Arc<ResolverChain>) -> Result<Self> {
        let trusted_proxies = parse_trusted_proxies(&config.trusted_proxies)?;
        Ok(Self {
            state: Arc::new(GeoState {
                ip_header: config.ip_header.clone(),
                trusted_proxies,
                recursive: config.recursive,
                context_keys: config.context.clone(),
                chain,
            }),
        })
    }
}

impl<S, B> Transform<S, ServiceRequest> for GeoMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = GeoService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GeoService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct GeoService<S> {
    service: Rc<S>,
    state: Arc<GeoState>,
}

impl<S, B> Service<ServiceRequest> for GeoService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let state = &self.state;

        let header_value = req
            .headers()
            .get(state.ip_header.as_str())
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
            .to_string();

        let ip = extract_real_ip(&header_value, &state.trusted_proxies, state.recursive);

        if ip.is_empty() {
            warn!("No client IP found in header: {}", state.ip_header);
        } else if let Some(result) = state.chain.lookup(&ip) {
            req.extensions_mut()
                .insert(RequestGeoContext::build(&state.context_keys, &result));
        }
        // miss 时不写上下文，请求照常进入后续管线

        Box::pin(async move { srv.call(req).await })
    }
}
