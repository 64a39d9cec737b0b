//! Admin API：GeoIP 数据库管理
//!
//! 仅供运维使用；鉴权由外层部署（反向代理等）负责，本层不做认证。

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use tracing::info;

use crate::services::geoip::GeoIpRegistry;

pub struct AdminService;

impl AdminService {
    /// POST /admin/geoip/{name}/reload
    ///
    /// 触发指定 resolver 的数据库热重载，返回纯文本结果。
    /// 重载失败时旧镜像继续服务，接口返回 500 与失败原因。
    pub async fn reload_geo_database(
        path: web::Path<String>,
        registry: web::Data<Arc<GeoIpRegistry>>,
    ) -> impl Responder {
        let name = path.into_inner();
        info!("Received reload request for resolver \"{}\"", name);

        let Some(provider) = registry.get(&name) else {
            return HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body(format!("unknown resolver: {}", name));
        };

        match provider.reload() {
            Ok(()) => HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body("OK"),
            Err(e) => HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body(format!("reload failed: {}", e)),
        }
    }
}

/// 管理路由 `/admin`
pub fn admin_routes() -> actix_web::Scope {
    web::scope("/admin").route(
        "/geoip/{name}/reload",
        web::post().to(AdminService::reload_geo_database),
    )
}
