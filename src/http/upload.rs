use crate::callback::CallBack;
use crate::error::GitInnerError;
use crate::http::UPLOAD_PACK_CONTENT_TYPE;
use crate::serve::AppCore;
use crate::transaction::upload::command::{UploadCommand, UploadRequest};
use crate::transaction::{GitProtoVersion, Transaction};
use actix_web::{HttpRequest, HttpResponse, web};
use async_stream::stream;
use std::io;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// `POST /git-upload-pack`: runs one v2 command and streams the answer.
///
/// The body is decoded before anything is sent, so framing problems and
/// unknown commands still get a clean 400. From the 200 on, the session runs
/// in its own task and feeds the response through a bounded channel; a
/// failure there can only cut the stream short.
pub async fn upload_pack(
    req: HttpRequest,
    body: web::Bytes,
    app: web::Data<AppCore>,
) -> Result<HttpResponse, GitInnerError> {
    info!("{} {}", req.method(), req.uri());
    debug!("body: {:?}", body);
    let version = GitProtoVersion::from_header(
        req.headers()
            .get("Git-Protocol")
            .and_then(|header| header.to_str().ok()),
    );
    let request = UploadRequest::parse(body)
        .inspect_err(|err| warn!("rejecting upload-pack request: {}", err))?;
    if let UploadCommand::Unknown(name) = &request.command {
        warn!("rejecting unknown command {:?}", name);
        return Err(GitInnerError::UnknownCommand(name.clone()));
    }

    let (call_back, mut receiver) = CallBack::channel(app.config.upload.channel_buffer);
    let mut transaction = Transaction::command(version, call_back);
    if let Some(timeout) = app.config.upload.request_timeout() {
        transaction = transaction.with_deadline(Instant::now() + timeout);
    }
    let ref_store = app.ref_store.clone();
    let mut producer = app.payload.producer();
    actix_web::rt::spawn(async move {
        let result = transaction
            .upload_pack_v2(&request, ref_store.as_ref(), producer.as_mut())
            .await;
        match result {
            Ok(()) => debug!("{:?} finished", request.command),
            Err(err) => error!("upload-pack {:?} aborted: {}", request.command, err),
        }
    });

    let stream = stream! {
        while let Some(next) = receiver.recv().await {
            yield Ok::<_, io::Error>(next);
        }
    };
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-cache"))
        .content_type(UPLOAD_PACK_CONTENT_TYPE)
        .streaming(stream))
}
