use crate::config::http::HttpConfig;
use crate::serve::AppCore;
use actix_web::web::{Data, PayloadConfig, ServiceConfig, get, post};
use actix_web::{App, HttpRequest, HttpResponse};
use tracing::{info, warn};

pub const UPLOAD_PACK_CONTENT_TYPE: &str = "application/x-git-upload-pack-advertisement";

/// Owns the route table for the lifetime of the process.
#[derive(Clone)]
pub struct HttpServer {
    pub config: HttpConfig,
    pub core: AppCore,
}

impl HttpServer {
    pub fn new(config: HttpConfig, core: AppCore) -> Self {
        Self { config, core }
    }

    pub async fn run(&self) -> std::io::Result<()> {
        let core = self.core.clone();
        let max_request_bytes = self.config.max_request_bytes;
        let mut server = actix_web::HttpServer::new(move || {
            App::new()
                .app_data(Data::new(core.clone()))
                .app_data(PayloadConfig::new(max_request_bytes))
                .wrap(actix_web::middleware::Logger::new(
                    "%a %r %s %b bytes in %D microseconds %{git-protocol}i",
                ))
                .configure(routes)
        });
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }
        info!("listening on {}", self.config.bind_addr());
        server.bind(self.config.bind_addr())?.run().await
    }
}

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.route("/info/refs", get().to(refs::refs))
        .route("/git-upload-pack", post().to(upload::upload_pack))
        .default_service(actix_web::web::to(not_found));
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    warn!(
        "404 - {} (from {})",
        req.uri(),
        req.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    HttpResponse::NotFound().finish()
}

pub mod refs;
pub mod upload;


#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn test_unknown_path_is_404() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(testing::quick_core()))
                .configure(routes),
        )
        .await;
        for uri in ["/anything-else", "/info/refs/extra", "/git-receive-pack"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_wrong_method_is_404() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(testing::quick_core()))
                .configure(routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/git-upload-pack").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
