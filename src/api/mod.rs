//! Eco Connect web front end.
//!
//! A small blocking HTTP/1.1 server: one listener thread, one request per
//! connection, handled in arrival order. Uploads are written to the upload
//! directory, classified, and remembered in an in-memory session.

pub mod http;
pub mod pages;

use anyhow::{anyhow, Context, Result};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::classify::Classifier;
use crate::config::AppConfig;
use crate::recommend::{centers_for_query, recommend, NOT_ANSWERED};
use crate::session::{Feedback, SessionData, SessionStore, SESSION_COOKIE};

use self::http::{
    multipart_boundary, parse_multipart, read_request, secure_filename, HttpRequest,
    HttpResponse, ReadError,
};

const UPLOADS_PREFIX: &str = "/static/uploads/";
const DEFAULT_IMAGE: &str = "default.jpg";
/// Label used for recommendations requested before any upload.
const NO_UPLOAD_LABEL: &str = "General Waste";

const ROUTES: &[&str] = &[
    "/",
    "/health",
    "/upload",
    "/upload_action",
    "/classify",
    "/questions",
    "/recommendations",
    "/feedback",
    "/centers",
    "/api/session",
];

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self::from(&app)
    }
}

impl From<&AppConfig> for ApiConfig {
    fn from(app: &AppConfig) -> Self {
        Self {
            addr: app.addr.clone(),
            upload_dir: app.upload_dir.clone(),
            max_upload_bytes: app.max_upload_bytes,
        }
    }
}

#[derive(Debug)]
pub struct ApiHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ApiHandle {
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("api server thread panicked"))?;
        }
        Ok(())
    }
}

pub struct ApiServer {
    cfg: ApiConfig,
    classifier: Classifier,
}

impl ApiServer {
    pub fn new(cfg: ApiConfig, classifier: Classifier) -> Self {
        Self { cfg, classifier }
    }

    pub fn spawn(self) -> Result<ApiHandle> {
        let configured_addr: SocketAddr = self
            .cfg
            .addr
            .parse()
            .with_context(|| format!("invalid listen address '{}'", self.cfg.addr))?;
        std::fs::create_dir_all(&self.cfg.upload_dir).with_context(|| {
            format!(
                "failed to create upload directory {}",
                self.cfg.upload_dir.display()
            )
        })?;
        let listener = TcpListener::bind(configured_addr)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let mut app = App {
            cfg: self.cfg,
            classifier: self.classifier,
            sessions: SessionStore::new(),
        };
        let join = std::thread::spawn(move || {
            if let Err(err) = run_api(listener, &mut app, shutdown_thread) {
                log::error!("web server stopped: {}", err);
            }
        });

        Ok(ApiHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

struct App {
    cfg: ApiConfig,
    classifier: Classifier,
    sessions: SessionStore,
}

fn run_api(listener: TcpListener, app: &mut App, shutdown: Arc<AtomicBool>) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, app) {
                    log::warn!("request failed: {}", err);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(20));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, app: &mut App) -> Result<()> {
    stream.set_nonblocking(false)?;
    http::set_read_timeout(&stream)?;

    let request = match read_request(&mut stream, app.cfg.max_upload_bytes) {
        Ok(request) => request,
        Err(ReadError::TooLarge) => {
            let page = pages::error("Upload too large", "Please choose a smaller image.");
            HttpResponse::new(413, "text/html; charset=utf-8", page).write_to(&mut stream)?;
            return Ok(());
        }
        Err(ReadError::Malformed(err)) => {
            HttpResponse::json(400, r#"{"error":"bad_request"}"#).write_to(&mut stream)?;
            return Err(err);
        }
    };

    let presented = request.cookie(SESSION_COOKIE).map(str::to_string);
    let mut session_id = app.sessions.touch(presented.as_deref());

    let mut response = match route(app, &request, &mut session_id) {
        Ok(response) => response,
        Err(err) => {
            log::warn!("{} {} failed: {:#}", request.method, request.path, err);
            HttpResponse::new(
                500,
                "text/html; charset=utf-8",
                pages::error("Something went wrong", "Please try again."),
            )
        }
    };
    let started = session_id.filter(|id| presented.as_deref() != Some(id.as_str()));
    if let Some(session_id) = started {
        response = response.with_header(
            "Set-Cookie",
            format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax"),
        );
    }
    log::debug!("{} {} -> {}", request.method, request.path, response.status);
    response.write_to(&mut stream)
}

/// `session_id` is the caller's live session, if any. Only handlers that
/// store something create one.
fn route(
    app: &mut App,
    request: &HttpRequest,
    session_id: &mut Option<String>,
) -> Result<HttpResponse> {
    let method = request.method.as_str();
    let path = request.path.as_str();

    if let Some(name) = path.strip_prefix(UPLOADS_PREFIX) {
        return match method {
            "GET" => serve_upload(app, name),
            _ => Ok(method_not_allowed()),
        };
    }

    match (method, path) {
        ("GET", "/") => Ok(HttpResponse::html(pages::home())),
        ("GET", "/health") => {
            let body = serde_json::json!({
                "status": "ok",
                "classifier": app.classifier.backend_name(),
            });
            Ok(HttpResponse::json(200, serde_json::to_vec(&body)?))
        }
        ("GET", "/upload") => Ok(HttpResponse::html(pages::upload())),
        ("POST", "/upload_action") => upload_action(app, request, session_id),
        ("GET", "/classify") => Ok(classify_page(session(app, session_id.as_deref()))),
        ("GET", "/questions") => Ok(HttpResponse::html(pages::questions())),
        ("POST", "/recommendations") => recommendations(app, request, session_id),
        ("GET", "/feedback") => {
            let saved = session(app, session_id.as_deref())
                .feedback
                .as_ref()
                .map(|feedback| feedback.rating);
            Ok(HttpResponse::html(pages::feedback(saved)))
        }
        ("POST", "/feedback") => submit_feedback(app, request, session_id),
        ("GET", "/centers") => {
            let query = request.query_params();
            let category = query.get("category").map(String::as_str).unwrap_or("");
            let centers = centers_for_query(category);
            Ok(HttpResponse::json(200, serde_json::to_vec(&centers)?))
        }
        ("GET", "/api/session") => {
            let data = session(app, session_id.as_deref());
            Ok(HttpResponse::json(200, serde_json::to_vec(data)?))
        }
        (_, path) if ROUTES.contains(&path) => Ok(method_not_allowed()),
        _ => Ok(HttpResponse::new(
            404,
            "text/html; charset=utf-8",
            pages::error("Not found", "There is nothing at this address."),
        )),
    }
}

fn method_not_allowed() -> HttpResponse {
    HttpResponse::json(405, r#"{"error":"method_not_allowed"}"#)
}

fn session<'a>(app: &'a App, session_id: Option<&str>) -> &'a SessionData {
    static EMPTY: SessionData = SessionData {
        uploaded_image: None,
        classification: None,
        recommendation: None,
        feedback: None,
    };
    session_id
        .and_then(|id| app.sessions.get(id))
        .unwrap_or(&EMPTY)
}

/// Writable session, started on first write.
fn session_mut<'a>(
    app: &'a mut App,
    session_id: &mut Option<String>,
) -> Result<&'a mut SessionData> {
    let id = match session_id.as_ref() {
        Some(id) => id.clone(),
        None => {
            let id = app.sessions.create();
            *session_id = Some(id.clone());
            id
        }
    };
    app.sessions
        .get_mut(&id)
        .ok_or_else(|| anyhow!("session {} vanished", id))
}

fn upload_action(
    app: &mut App,
    request: &HttpRequest,
    session_id: &mut Option<String>,
) -> Result<HttpResponse> {
    let Some(boundary) = request.header("content-type").and_then(multipart_boundary) else {
        return Ok(HttpResponse::redirect("/upload"));
    };
    let fields = parse_multipart(&request.body, &boundary)?;
    let Some(file) = fields.into_iter().find(|field| field.name == "file") else {
        return Ok(HttpResponse::redirect("/upload"));
    };
    let filename = secure_filename(file.filename.as_deref().unwrap_or(""));
    if filename.is_empty() {
        return Ok(HttpResponse::redirect("/upload"));
    }

    let path = app.cfg.upload_dir.join(&filename);
    std::fs::write(&path, &file.data)
        .with_context(|| format!("failed to save upload {}", path.display()))?;
    log::info!("saved upload {} ({} bytes)", filename, file.data.len());

    let result = app.classifier.classify(&path);
    let data = session_mut(app, session_id)?;
    data.uploaded_image = Some(filename);
    data.classification = Some(result);
    data.recommendation = None;
    Ok(HttpResponse::redirect("/classify"))
}

fn serve_upload(app: &App, name: &str) -> Result<HttpResponse> {
    let safe = secure_filename(name);
    if safe.is_empty() || safe != name {
        return Ok(HttpResponse::new(404, "text/plain; charset=utf-8", "not found"));
    }
    let path = app.cfg.upload_dir.join(&safe);
    match std::fs::read(&path) {
        Ok(bytes) => Ok(HttpResponse::new(200, http::content_type_for(&safe), bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Ok(HttpResponse::new(404, "text/plain; charset=utf-8", "not found"))
        }
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn classify_page(data: &SessionData) -> HttpResponse {
    let image = data.uploaded_image.as_deref().unwrap_or(DEFAULT_IMAGE);
    let image_url = format!("{UPLOADS_PREFIX}{image}");
    let (label, confidence, components) = match &data.classification {
        Some(result) => (
            result.label.as_str(),
            result.confidence.as_str(),
            result.components.as_slice(),
        ),
        None => ("Unknown", "0.00", &[][..]),
    };
    HttpResponse::html(pages::classify(&pages::ClassifyView {
        image_url: &image_url,
        label,
        confidence,
        components,
    }))
}

fn recommendations(
    app: &mut App,
    request: &HttpRequest,
    session_id: &mut Option<String>,
) -> Result<HttpResponse> {
    let form = request.form();
    let condition = form
        .get("condition")
        .map(String::as_str)
        .unwrap_or(NOT_ANSWERED);
    let intent = form.get("intent").map(String::as_str).unwrap_or(NOT_ANSWERED);
    let label = session(app, session_id.as_deref())
        .classification
        .as_ref()
        .map(|result| result.label.clone())
        .unwrap_or_else(|| NO_UPLOAD_LABEL.to_string());

    let rec = recommend(&label, condition, intent);
    log::info!(
        "recommended {} for {} (intent {}, condition {})",
        rec.user_recommendation,
        label,
        intent,
        condition
    );
    let page = pages::recommendations(&rec);
    session_mut(app, session_id)?.recommendation = Some(rec);
    Ok(HttpResponse::html(page))
}

fn submit_feedback(
    app: &mut App,
    request: &HttpRequest,
    session_id: &mut Option<String>,
) -> Result<HttpResponse> {
    let form = request.form();
    let rating = form
        .get("rating")
        .and_then(|value| value.trim().parse::<u8>().ok())
        .filter(|rating| (1..=5).contains(rating));
    let Some(rating) = rating else {
        return Ok(HttpResponse::new(
            400,
            "text/html; charset=utf-8",
            pages::error("Invalid rating", "Please pick a rating from 1 to 5."),
        ));
    };
    let comment = form
        .get("comment")
        .map(|value| value.trim().to_string())
        .unwrap_or_default();
    log::info!("feedback received: {} stars", rating);
    session_mut(app, session_id)?.feedback = Some(Feedback { rating, comment });
    Ok(HttpResponse::html(pages::feedback(Some(rating))))
}
