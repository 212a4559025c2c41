//! Request correlation and access logging.
//!
//! Every request runs inside a [`TraceId`] scope. A well-formed `trace-id`
//! header sent by the client is reused so a browser session can correlate
//! its own logs; anything else is replaced with a fresh UUID. The identifier
//! is echoed on the response and one access log line is written per request.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, info, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware that scopes a [`TraceId`] to each request and logs its outcome.
///
/// Handlers read the identifier via [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use institute::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_client)
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let method = req.method().clone();
        let path = req.path().to_owned();
        let started = Instant::now();
        let fut = self.service.call(req);

        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = fut.await?;
            let status = res.status();
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            if status.is_server_error() {
                warn!(%trace_id, %method, %path, status = status.as_u16(), elapsed_ms, "request failed");
            } else {
                info!(%trace_id, %method, %path, status = status.as_u16(), elapsed_ms, "request completed");
            }

            match HeaderValue::from_str(&trace_id.to_string()) {
                Ok(value) => {
                    res.response_mut()
                        .headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }
                Err(error) => {
                    error!(%error, %trace_id, "trace identifier is not a valid header value");
                }
            }
            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiResult, Error as DomainError};
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::Value;

    const CLIENT_TRACE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn echo_trace_id() -> HttpResponse {
        let body = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
        HttpResponse::Ok().body(body)
    }

    fn response_trace_id<B>(res: &ServiceResponse<B>) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned()
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not-a-uuid"))]
    #[actix_web::test]
    async fn generates_trace_id_when_client_sends_none_usable(#[case] header: Option<&str>) {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_trace_id)))
                .await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }

        let res = test::call_service(&app, req.to_request()).await;
        let trace_id = response_trace_id(&res);
        assert!(trace_id.parse::<TraceId>().is_ok());
        assert_ne!(Some(trace_id.as_str()), header);

        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), trace_id);
    }

    #[actix_web::test]
    async fn reuses_well_formed_client_trace_id() {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_trace_id)))
                .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((TRACE_ID_HEADER, CLIENT_TRACE_ID))
            .to_request();

        let res = test::call_service(&app, req).await;
        assert_eq!(response_trace_id(&res), CLIENT_TRACE_ID);
    }

    #[actix_web::test]
    async fn error_payload_carries_the_response_trace_id() {
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async {
                ApiResult::<HttpResponse>::Err(DomainError::not_found("No such student"))
            }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let trace_id = response_trace_id(&res);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["traceId"].as_str(), Some(trace_id.as_str()));
        assert_eq!(body["message"], "No such student");
    }
}
