use crate::error::GitInnerError;
use crate::http::UPLOAD_PACK_CONTENT_TYPE;
use crate::transaction::Transaction;
use crate::transaction::advertise::validate_advertisement;
use actix_web::{HttpRequest, HttpResponse, web};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct RefsQuery {
    service: Option<String>,
}

/// `GET /info/refs`: the v2 capability advertisement.
pub async fn refs(
    req: HttpRequest,
    query: web::Query<RefsQuery>,
) -> Result<HttpResponse, GitInnerError> {
    info!("{} {}", req.method(), req.uri());
    for (name, value) in req.headers() {
        debug!("\t{}: {:?}", name, value);
    }
    let protocol = req
        .headers()
        .get("Git-Protocol")
        .and_then(|header| header.to_str().ok());
    let (version, service) = validate_advertisement(protocol, query.service.as_deref())
        .inspect_err(|err| warn!("rejecting advertisement: {}", err))?;
    debug!("advertising {} over protocol v{}", service.to_string(), version.to_str());

    let mut transaction = Transaction::advertisement(version, Vec::<Bytes>::new());
    transaction.write_advertise_v2().await?;
    let body = transaction.into_transport().concat();
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-cache"))
        .content_type(UPLOAD_PACK_CONTENT_TYPE)
        .body(body))
}

#[cfg(test)]
mod tests {
    use crate::http::testing::{decode, quick_core};
    use crate::http::{UPLOAD_PACK_CONTENT_TYPE, routes};
    use crate::pkt_line::Packet;
    use actix_web::http::StatusCode;
    use actix_web::web::Data;
    use actix_web::{App, test};
    use bytes::Bytes;

    macro_rules! app {
        () => {
            test::init_service(App::new().app_data(Data::new(quick_core())).configure(routes))
                .await
        };
    }

    #[actix_web::test]
    async fn test_valid_advertisement() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/info/refs?service=git-upload-pack")
            .insert_header(("Git-Protocol", "version=2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            UPLOAD_PACK_CONTENT_TYPE
        );
        assert_eq!(resp.headers().get("Cache-Control").unwrap(), "no-cache");
        let body = test::read_body(resp).await;
        assert_eq!(
            decode(body),
            vec![
                Packet::Data(Bytes::from_static(b"version 2\n")),
                Packet::Data(Bytes::from_static(b"ls-refs\n")),
                Packet::Data(Bytes::from_static(b"fetch\n")),
                Packet::Flush,
            ]
        );
    }

    #[actix_web::test]
    async fn test_missing_protocol_header() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/info/refs?service=git-upload-pack")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(test::read_body(resp).await.is_empty());
    }

    #[actix_web::test]
    async fn test_wrong_protocol_version() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/info/refs?service=git-upload-pack")
            .insert_header(("Git-Protocol", "version=1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_bad_service() {
        let app = app!();
        for uri in [
            "/info/refs",
            "/info/refs?service=git-receive-pack",
            "/info/refs?service=",
        ] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(("Git-Protocol", "version=2"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert!(test::read_body(resp).await.is_empty());
        }
    }
}
