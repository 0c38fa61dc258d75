use anyhow::Result;
use serde_json::Value;
use std::io::{Read, Write};
use std::net::TcpStream;
use tempfile::tempdir;

use eco_connect::api::{ApiConfig, ApiHandle, ApiServer};
use eco_connect::classify::{Classifier, KeywordBackend, Prediction, StubBackend};

const BOUNDARY: &str = "----EcoBoundary7MA4YWxk";

struct TestApi {
    dir: tempfile::TempDir,
    api_handle: Option<ApiHandle>,
}

impl TestApi {
    fn new(classifier: Classifier) -> Result<Self> {
        Self::with_limit(classifier, 1024 * 1024)
    }

    fn with_limit(classifier: Classifier, max_upload_bytes: usize) -> Result<Self> {
        let dir = tempdir()?;
        let api_config = ApiConfig {
            addr: "127.0.0.1:0".to_string(),
            upload_dir: dir.path().join("uploads"),
            max_upload_bytes,
        };
        let api_handle = ApiServer::new(api_config, classifier).spawn()?;
        Ok(Self {
            dir,
            api_handle: Some(api_handle),
        })
    }

    fn handle(&self) -> &ApiHandle {
        self.api_handle
            .as_ref()
            .expect("test API handle should be initialized")
    }

    fn send(&self, request: &[u8]) -> Result<(String, String)> {
        let mut stream = TcpStream::connect(self.handle().addr)?;
        stream.write_all(request)?;
        read_response(&mut stream)
    }

    fn get(&self, path: &str, cookie: Option<&str>) -> Result<(String, String)> {
        let request = format!(
            "GET {path} HTTP/1.1\r\nHost: localhost\r\n{}\r\n",
            cookie_header(cookie)
        );
        self.send(request.as_bytes())
    }

    fn post_form(&self, path: &str, body: &str, cookie: Option<&str>) -> Result<(String, String)> {
        let request = format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n{}\r\n{body}",
            body.len(),
            cookie_header(cookie)
        );
        self.send(request.as_bytes())
    }

    fn upload(&self, filename: &str, data: &[u8]) -> Result<(String, String)> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut request = format!(
            "POST /upload_action HTTP/1.1\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary={BOUNDARY}\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        request.extend_from_slice(&body);
        self.send(&request)
    }
}

impl Drop for TestApi {
    fn drop(&mut self) {
        if let Some(handle) = self.api_handle.take() {
            handle.stop().expect("failed to stop API server");
        }
    }
}

fn cookie_header(cookie: Option<&str>) -> String {
    match cookie {
        Some(value) => format!("Cookie: {value}\r\n"),
        None => String::new(),
    }
}

fn read_response(stream: &mut TcpStream) -> Result<(String, String)> {
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw)?;
    let response = String::from_utf8_lossy(&raw).to_string();
    let mut parts = response.splitn(2, "\r\n\r\n");
    let headers = parts.next().unwrap_or("").to_string();
    let body = parts.next().unwrap_or("").to_string();
    Ok((headers, body))
}

fn session_cookie(headers: &str) -> Option<String> {
    headers
        .lines()
        .find_map(|line| line.strip_prefix("Set-Cookie: "))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

fn png_bytes() -> Result<Vec<u8>> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([120, 90, 60]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[test]
fn health_reports_active_backend() -> Result<()> {
    let api = TestApi::new(Classifier::new(KeywordBackend::new()))?;
    let (headers, body) = api.get("/health", None)?;
    assert!(headers.contains("200 OK"));
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["classifier"], "keyword");
    Ok(())
}

#[test]
fn upload_classify_and_recommend_flow() -> Result<()> {
    let api = TestApi::new(Classifier::new(KeywordBackend::new()))?;

    let (headers, _) = api.upload("old tin_can.png", &png_bytes()?)?;
    assert!(headers.contains("303 See Other"));
    assert!(headers.contains("Location: /classify"));
    let cookie = session_cookie(&headers).expect("session cookie");
    assert!(api.dir.path().join("uploads/old_tin_can.png").exists());

    let (headers, body) = api.get("/classify", Some(&cookie))?;
    assert!(headers.contains("200 OK"));
    assert!(body.contains("Detected: <strong>tin_can</strong>"));
    assert!(body.contains("Confidence: 95.00%"));
    assert!(body.contains("<li>Aluminum/Steel Alloy</li>"));
    assert!(body.contains(r#"src="/static/uploads/old_tin_can.png""#));

    let (headers, body) =
        api.post_form("/recommendations", "condition=Good&intent=Sell", Some(&cookie))?;
    assert!(headers.contains("200 OK"));
    assert!(body.contains("What is best: Sell &amp; Recycle"));
    assert!(body.contains("Your response: Sell to Scrap Dealer"));
    assert!(body.contains("EcoWaste Scrap Metal"));

    let (_, body) = api.get("/api/session", Some(&cookie))?;
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["classification"]["label"], "tin_can");
    assert_eq!(value["recommendation"]["category"], "Metals");
    assert_eq!(value["recommendation"]["centers"][0]["type"], "Recycler");

    let (headers, body) = api.get("/static/uploads/old_tin_can.png", Some(&cookie))?;
    assert!(headers.contains("200 OK"));
    assert!(headers.contains("Content-Type: image/png"));
    assert!(!body.is_empty());

    Ok(())
}

#[test]
fn unrecognized_upload_without_model_is_unknown_object() -> Result<()> {
    let api = TestApi::new(Classifier::new(KeywordBackend::new()))?;
    let (headers, _) = api.upload("blank.png", &png_bytes()?)?;
    let cookie = session_cookie(&headers).expect("session cookie");

    let (_, body) = api.get("/api/session", Some(&cookie))?;
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["classification"]["label"], "Unknown Object");
    assert_eq!(value["classification"]["confidence"], "0.00");
    Ok(())
}

#[test]
fn broken_image_yields_system_error_page() -> Result<()> {
    let backend = StubBackend::new().with_predictions(vec![Prediction::new("laptop", 0.8)]);
    let api = TestApi::new(Classifier::new(backend))?;

    let (headers, _) = api.upload("laptop.jpg", b"these bytes are not a jpeg")?;
    assert!(headers.contains("303 See Other"));
    let cookie = session_cookie(&headers).expect("session cookie");

    let (_, body) = api.get("/classify", Some(&cookie))?;
    assert!(body.contains("Detected: <strong>System Error</strong>"));
    assert!(body.contains("<li>Analysis Failed</li>"));
    Ok(())
}

#[test]
fn model_backend_result_drives_recommendation() -> Result<()> {
    let backend = StubBackend::new().with_predictions(vec![
        Prediction::new("sweatshirt", 0.7123),
        Prediction::new("jersey", 0.1),
    ]);
    let api = TestApi::new(Classifier::new(backend))?;

    let (headers, _) = api.upload("photo.png", &png_bytes()?)?;
    let cookie = session_cookie(&headers).expect("session cookie");

    let (_, body) =
        api.post_form("/recommendations", "condition=Usable&intent=Donate", Some(&cookie))?;
    assert!(body.contains("Your response: Donate to NGO"));
    assert!(body.contains("Hope Foundation (Cloth/Books)"));
    Ok(())
}

#[test]
fn upload_without_file_redirects_back() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;

    let (headers, _) = api.upload("", b"data")?;
    assert!(headers.contains("Location: /upload"));

    let (headers, _) = api.post_form("/upload_action", "file=nope", None)?;
    assert!(headers.contains("303 See Other"));
    assert!(headers.contains("Location: /upload"));
    Ok(())
}

#[test]
fn recommendations_without_upload_default_to_garbage() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;
    let (headers, body) = api.post_form("/recommendations", "", None)?;
    assert!(headers.contains("200 OK"));
    assert!(body.contains("What is best: Compost"));
    assert!(body.contains("User indicated intention: N/A. Condition: N/A."));
    Ok(())
}

#[test]
fn feedback_is_validated_and_remembered() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;

    let (headers, _) = api.post_form("/feedback", "rating=9", None)?;
    assert!(headers.contains("400 Bad Request"));

    let (headers, body) = api.post_form("/feedback", "rating=4&comment=Great+app", None)?;
    assert!(headers.contains("200 OK"));
    assert!(body.contains("You rated us 4 of 5"));
    let cookie = session_cookie(&headers).expect("session cookie");

    let (_, body) = api.get("/api/session", Some(&cookie))?;
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["feedback"]["rating"], 4);
    assert_eq!(value["feedback"]["comment"], "Great app");
    Ok(())
}

#[test]
fn centers_endpoint_filters_by_category() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;

    let (_, body) = api.get("/centers?category=Cloth", None)?;
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["type"], "NGO");

    let (_, body) = api.get("/centers?category=furniture", None)?;
    let value: Value = serde_json::from_str(&body)?;
    let names: Vec<_> = value
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "GreenCycle Solutions",
            "EcoWaste Scrap Metal",
            "Hope Foundation (Cloth/Books)"
        ]
    );
    Ok(())
}

#[test]
fn unknown_routes_and_methods_are_rejected() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;

    let (headers, _) = api.get("/nowhere", None)?;
    assert!(headers.contains("404 Not Found"));

    let (headers, _) = api.get("/upload_action", None)?;
    assert!(headers.contains("405 Method Not Allowed"));

    let (headers, _) = api.get("/static/uploads/..%2Fsecret", None)?;
    assert!(headers.contains("404 Not Found"));
    Ok(())
}

#[test]
fn oversized_upload_is_refused() -> Result<()> {
    let api = TestApi::with_limit(Classifier::default(), 64)?;
    let request =
        "POST /upload_action HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100000\r\n\r\n";
    let (headers, _) = api.send(request.as_bytes())?;
    assert!(headers.contains("413 Payload Too Large"));
    Ok(())
}

#[test]
fn pages_render_for_every_step() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;
    for (path, marker) in [
        ("/", "Eco Connect"),
        ("/upload", r#"enctype="multipart/form-data""#),
        ("/questions", r#"name="intent""#),
        ("/feedback", r#"name="rating""#),
        ("/classify", "Detected: <strong>Unknown</strong>"),
    ] {
        let (headers, body) = api.get(path, None)?;
        assert!(headers.contains("200 OK"), "{path} did not render");
        assert!(body.contains(marker), "{path} is missing {marker}");
    }
    Ok(())
}

#[test]
fn read_only_requests_do_not_start_sessions() -> Result<()> {
    let api = TestApi::new(Classifier::default())?;
    for path in ["/", "/health", "/classify", "/centers?category=Metals", "/api/session"] {
        let (headers, _) = api.get(path, None)?;
        assert!(headers.contains("200 OK"), "{path} failed");
        assert!(session_cookie(&headers).is_none(), "{path} set a cookie");
    }
    Ok(())
}

#[test]
fn cookieless_polling_keeps_active_sessions() -> Result<()> {
    let api = TestApi::new(Classifier::new(KeywordBackend::new()))?;
    let (headers, _) = api.upload("tin_can.png", &png_bytes()?)?;
    let cookie = session_cookie(&headers).expect("session cookie");

    for _ in 0..1100 {
        api.get("/health", None)?;
    }
    let (_, body) = api.get("/classify", Some(&cookie))?;
    assert!(body.contains("Detected: <strong>tin_can</strong>"));
    Ok(())
}
