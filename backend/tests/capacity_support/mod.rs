//! Shared HTTP harness for endpoint tests against the in-memory backend.

use std::path::Path;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use capacity_backend::inbound::http::api_services;
use capacity_backend::inbound::http::state::{HttpState, HttpStateConfig};
use capacity_backend::outbound::memory::MemoryStore;
use serde_json::{Value, json};

pub(crate) const EMAIL: &str = "ops@example.com";
pub(crate) const PASSWORD: &str = "s3cret-pass";

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Initialise the `/api` scope over a fresh in-memory store.
pub(crate) async fn init_app(
    fixtures_dir: &Path,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> + use<>
{
    let config = HttpStateConfig {
        fixtures_dir: fixtures_dir.to_path_buf(),
        // bcrypt 0.17 keeps its `MIN_COST` (4) private.
        hash_cost: 4,
    };
    let state = HttpState::new(MemoryStore::new().ports(), config);
    test::init_service(
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api")
                .wrap(session_middleware())
                .configure(api_services),
        ),
    )
    .await
}

/// Issue `req` and decode the JSON body, if any.
pub(crate) async fn call_json<S>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

/// Register the default account and return an authenticated session cookie.
pub(crate) async fn login<S>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let register = TestRequest::post()
        .uri("/api/register")
        .set_json(json!({"username": "ops", "email": EMAIL, "password": PASSWORD}))
        .to_request();
    let res = test::call_service(app, register).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let login = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": EMAIL, "password": PASSWORD}))
        .to_request();
    let res = test::call_service(app, login).await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// A valid record payload row.
pub(crate) fn record(id: u64, kind: &str, location: &str) -> Value {
    json!({
        "id": id,
        "sno": id,
        "capacity": 50.0,
        "group": "AGEL",
        "ppaMerchant": "PPA",
        "type": kind,
        "solar": 30.0,
        "wind": 20.0,
        "spv": "Adani Green One",
        "locationCode": "RJ",
        "location": location,
        "pss": "PSS-1",
        "connectivity": "CTU",
    })
}
