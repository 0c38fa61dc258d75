use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use eco_connect::classify::preprocess::InputLayout;
use eco_connect::config::{AppConfig, ModelOverrides};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "ECO_CONFIG",
        "ECO_ADDR",
        "ECO_UPLOAD_DIR",
        "ECO_MAX_UPLOAD_BYTES",
        "ECO_MODEL_PATH",
        "ECO_LABELS_PATH",
        "ECO_MODEL_LAYOUT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = AppConfig::load().expect("load config");
    assert_eq!(cfg.addr, "127.0.0.1:5000");
    assert_eq!(cfg.upload_dir, PathBuf::from("static/uploads"));
    assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.model.path, None);
    assert_eq!(cfg.model.input_size, 224);
    assert_eq!(cfg.model.top_k, 10);
    assert_eq!(cfg.model.layout, InputLayout::Nhwc);
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "addr": "0.0.0.0:8080",
        "upload_dir": "/var/lib/eco/uploads",
        "max_upload_bytes": 2048,
        "model": {
            "path": "/models/mobilenet_v2.onnx",
            "labels_path": "/models/imagenet.txt",
            "input_size": 192,
            "layout": "nchw",
            "top_k": 5
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("ECO_CONFIG", file.path());
    std::env::set_var("ECO_ADDR", "127.0.0.1:9000");
    std::env::set_var("ECO_MODEL_LAYOUT", "NHWC");

    let cfg = AppConfig::load().expect("load config");

    assert_eq!(cfg.addr, "127.0.0.1:9000");
    assert_eq!(cfg.upload_dir, PathBuf::from("/var/lib/eco/uploads"));
    assert_eq!(cfg.max_upload_bytes, 2048);
    assert_eq!(
        cfg.model.path,
        Some(PathBuf::from("/models/mobilenet_v2.onnx"))
    );
    assert_eq!(
        cfg.model.labels_path,
        Some(PathBuf::from("/models/imagenet.txt"))
    );
    assert_eq!(cfg.model.input_size, 192);
    assert_eq!(cfg.model.layout, InputLayout::Nhwc);
    assert_eq!(cfg.model.top_k, 5);

    clear_env();
}

#[test]
fn rejects_model_without_labels_and_bad_limits() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("ECO_MODEL_PATH", "/models/mobilenet_v2.onnx");
    assert!(AppConfig::load().is_err());
    clear_env();

    std::env::set_var("ECO_MAX_UPLOAD_BYTES", "lots");
    assert!(AppConfig::load().is_err());
    clear_env();

    std::env::set_var("ECO_MAX_UPLOAD_BYTES", "0");
    assert!(AppConfig::load().is_err());
    clear_env();
}

#[test]
fn invalid_config_file_is_reported() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"{ not json").expect("write config");
    std::env::set_var("ECO_CONFIG", file.path());

    let err = AppConfig::load().expect_err("invalid file must fail");
    assert!(err.to_string().contains("invalid config file"));

    clear_env();
}

#[test]
fn command_line_overrides_keep_file_model_settings() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{ "model": { "input_size": 192, "top_k": 5 } }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    std::env::set_var("ECO_CONFIG", file.path());

    let loaded = AppConfig::load().expect("load config").model;
    let settings = loaded
        .clone()
        .with_overrides(ModelOverrides {
            path: Some(PathBuf::from("/models/mobilenet_v2_192.onnx")),
            labels_path: Some(PathBuf::from("/models/imagenet.txt")),
            layout: Some(InputLayout::Nchw),
            ..ModelOverrides::default()
        })
        .expect("merged settings");
    assert_eq!(settings.input_size, 192);
    assert_eq!(settings.top_k, 5);
    assert_eq!(settings.layout, InputLayout::Nchw);
    assert_eq!(
        settings.path,
        Some(PathBuf::from("/models/mobilenet_v2_192.onnx"))
    );

    let missing_labels = loaded.clone().with_overrides(ModelOverrides {
        path: Some(PathBuf::from("/models/mobilenet_v2.onnx")),
        ..ModelOverrides::default()
    });
    assert!(missing_labels.is_err());

    let zero_size = loaded.with_overrides(ModelOverrides {
        input_size: Some(0),
        ..ModelOverrides::default()
    });
    assert!(zero_size.is_err());

    clear_env();
}
