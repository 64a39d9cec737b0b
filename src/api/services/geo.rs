//! 客户端地理信息调试接口
//!
//! 读取 geo 中间件写入的请求上下文并以 JSON 返回，供排查转发头与
//! resolver 配置使用，非生产接口。

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, web};
use tracing::trace;

use crate::api::context::RequestGeoContext;
use crate::config::ContextConfig;

pub struct GeoDebugService;

impl GeoDebugService {
    /// GET /debug/client-geo
    ///
    /// 中间件解析成功时返回完整 LookupResult JSON，否则返回 `{}`。
    pub async fn client_geo(
        req: HttpRequest,
        context_keys: web::Data<ContextConfig>,
    ) -> impl Responder {
        trace!("Received client geo debug request");

        let value = req
            .extensions()
            .get::<RequestGeoContext>()
            .and_then(|context| context.get(&context_keys.lookup_result_key))
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        HttpResponse::Ok().json(value)
    }
}

/// 调试路由 `/debug`
pub fn debug_routes() -> actix_web::Scope {
    web::scope("/debug").route("/client-geo", web::get().to(GeoDebugService::client_geo))
}
