//! In-process stub of the request-handling backend.
//!
//! An actix-web server bound to an ephemeral port serves the backend routes
//! from an in-memory user table and counts calls, so tests can drive the real
//! reqwest adapter end to end. Extra routes cover slow, text and failing
//! responses.

use std::collections::{BTreeMap, HashMap};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

pub const KNOWN_USER: &str = "demo@nalflo.com";
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct UserRecord {
    apis: BTreeMap<String, Value>,
    files: Value,
    dash_config: Value,
}

/// Shared state behind the stub routes.
#[derive(Debug)]
pub struct StubState {
    users: Mutex<HashMap<String, UserRecord>>,
    dashboard: Mutex<Value>,
    pub dashboard_fetches: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub pings: AtomicUsize,
    pub saves: AtomicUsize,
    pub code_updates: AtomicUsize,
    pub fail_saves: AtomicBool,
}

impl StubState {
    fn new() -> Self {
        let mut users = HashMap::new();
        users.insert(
            KNOWN_USER.to_owned(),
            UserRecord {
                apis: BTreeMap::new(),
                files: json!({
                    "sales.csv": { "description": "Quarterly sales" },
                    "notes.txt": { "description": "Meeting notes" }
                }),
                dash_config: Value::Null,
            },
        );
        Self {
            users: Mutex::new(users),
            dashboard: Mutex::new(json!({
                "title": "Overview",
                "gridSize": { "rows": 2, "cols": 3 },
                "tiles": [],
                "readinessFlag": false
            })),
            dashboard_fetches: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            pings: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            code_updates: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Replace the dashboard returned by `/get_dashboard`.
    pub fn set_dashboard(&self, dashboard: Value) {
        *self.dashboard.lock().expect("dashboard lock") = dashboard;
    }

    /// Source code stored for `path`, if the endpoint exists.
    pub fn stored_code(&self, user: &str, path: &str) -> Option<String> {
        let users = self.users.lock().expect("users lock");
        users
            .get(user)?
            .apis
            .get(path)?
            .get("code")?
            .as_str()
            .map(str::to_owned)
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Running stub server.
pub struct StubBackend {
    pub base_url: String,
    pub state: Arc<StubState>,
    handle: ServerHandle,
}

impl StubBackend {
    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

/// Start the stub on `127.0.0.1` with an ephemeral port.
pub async fn spawn_stub_backend() -> StubBackend {
    let state = web::Data::new(StubState::new());
    let shared = state.clone().into_inner();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/ping", web::post().to(ping))
            .route("/get_dashboard", web::post().to(get_dashboard))
            .route("/force_refresh_dashboard", web::post().to(force_refresh))
            .route("/get_apis", web::post().to(get_apis))
            .route("/create_api", web::post().to(create_api))
            .route("/save_server", web::post().to(save_server))
            .route("/update_api_code", web::post().to(update_api_code))
            .route("/remove_api", web::post().to(remove_api))
            .route("/get_user_dash_config", web::post().to(get_settings))
            .route("/update_user_dash_config", web::post().to(update_settings))
            .route("/get_files", web::post().to(get_files))
            .route("/health", web::post().to(health))
            .route("/slow", web::post().to(slow))
            .route("/text", web::post().to(text))
            .route("/boom", web::post().to(boom))
            .route("/echo", web::route().to(echo))
    })
    .disable_signals()
    .shutdown_timeout(1)
    .workers(1)
    .listen(listener)
    .expect("listen on stub socket")
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    StubBackend {
        base_url: format!("http://{addr}"),
        state: shared,
        handle,
    }
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn user_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "User not found" }))
}

async fn ping(state: web::Data<StubState>) -> HttpResponse {
    state.pings.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn get_dashboard(state: web::Data<StubState>) -> HttpResponse {
    state.dashboard_fetches.fetch_add(1, Ordering::SeqCst);
    let dashboard = state.dashboard.lock().expect("dashboard lock").clone();
    HttpResponse::Ok().json(json!({ "dashboard": dashboard }))
}

async fn force_refresh(state: web::Data<StubState>) -> HttpResponse {
    state.refreshes.fetch_add(1, Ordering::SeqCst);
    let mut dashboard = state.dashboard.lock().expect("dashboard lock");
    dashboard["readinessFlag"] = Value::Bool(true);
    dashboard["tiles"] = json!([
        { "id": 1, "title": "Revenue", "html": "<b>42</b>", "coordinates": [0, 0] },
        {
            "id": "traffic",
            "title": "Traffic",
            "html": "<i>7</i>",
            "coordinates": [[0, 1], [1, 1], [1, 2], [0, 2]]
        }
    ]);
    HttpResponse::Ok().json(json!({ "message": "refreshed" }))
}

async fn get_apis(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let users = state.users.lock().expect("users lock");
    match users.get(field(&body, "username")) {
        Some(user) => HttpResponse::Ok().json(json!({ "APIs": user.apis })),
        None => user_not_found(),
    }
}

async fn create_api(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let endpoint = field(&body, "endpoint").to_owned();
    if !endpoint.starts_with('/') {
        return HttpResponse::BadRequest().json(json!({ "error": "Endpoint must start with /" }));
    }
    let mut users = state.users.lock().expect("users lock");
    let username = field(&body, "username");
    let Some(user) = users.get_mut(username) else {
        return user_not_found();
    };
    if user.apis.contains_key(&endpoint) {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Endpoint {endpoint} already exists for user {username}")
        }));
    }
    user.apis.insert(
        endpoint.clone(),
        json!({
            "description": body["description"],
            "body_format": body["body_format"],
            "function_name": body["function_name"],
            "code": body["code"],
        }),
    );
    HttpResponse::Ok().json(json!({ "message": "API created successfully", "endpoint": endpoint }))
}

async fn save_server(state: web::Data<StubState>) -> HttpResponse {
    state.saves.fetch_add(1, Ordering::SeqCst);
    if state.fail_saves.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().body("could not write server file");
    }
    HttpResponse::Ok().json(json!({ "message": "saved" }))
}

async fn update_api_code(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    state.code_updates.fetch_add(1, Ordering::SeqCst);
    let mut users = state.users.lock().expect("users lock");
    let Some(user) = users.get_mut(field(&body, "username")) else {
        return user_not_found();
    };
    match user.apis.get_mut(field(&body, "endpoint")) {
        Some(api) => {
            api["code"] = body["code"].clone();
            HttpResponse::Ok().json(json!({ "message": "updated" }))
        }
        None => HttpResponse::NotFound().json(json!({ "error": "Endpoint not found" })),
    }
}

async fn remove_api(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let mut users = state.users.lock().expect("users lock");
    let Some(user) = users.get_mut(field(&body, "username")) else {
        return user_not_found();
    };
    match user.apis.remove(field(&body, "endpoint")) {
        Some(_) => HttpResponse::Ok().json(json!({ "message": "removed" })),
        None => HttpResponse::NotFound().json(json!({ "error": "Endpoint not found" })),
    }
}

async fn get_settings(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let users = state.users.lock().expect("users lock");
    match users.get(field(&body, "username")) {
        Some(user) => HttpResponse::Ok().json(json!({ "dash_config": user.dash_config })),
        None => user_not_found(),
    }
}

async fn update_settings(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let mut users = state.users.lock().expect("users lock");
    let Some(user) = users.get_mut(field(&body, "username")) else {
        return user_not_found();
    };
    user.dash_config = body["user_input"].clone();
    HttpResponse::Ok().json(json!({ "message": "updated" }))
}

async fn get_files(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let users = state.users.lock().expect("users lock");
    match users.get(field(&body, "username")) {
        Some(user) => HttpResponse::Ok().json(json!({ "files": user.files })),
        None => user_not_found(),
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}

async fn slow() -> HttpResponse {
    actix_web::rt::time::sleep(SLOW_DELAY).await;
    HttpResponse::Ok().json(json!({ "message": "finally" }))
}

async fn text() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("{\"looks\":\"like json\"}")
}

async fn boom() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/plain")
        .body("kaboom")
}

async fn echo(request: HttpRequest, body: web::Bytes) -> HttpResponse {
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let body = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    HttpResponse::Ok().json(json!({
        "method": request.method().as_str(),
        "contentType": content_type,
        "body": body,
    }))
}
