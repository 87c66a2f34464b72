//! Startup configuration: environment, command line and text catalog file.

use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;

use sdui::cli::args::{parse_args, CliCommand};
use sdui::config::AppConfig;
use sdui::models::TextCatalog;

const VARS: [&str; 4] = [
    "SDUI_BFF_URL",
    "SDUI_INITIAL_SCREEN",
    "SDUI_ADMIN_API_KEY",
    "SDUI_TEXTS_PATH",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn args(list: &[&str]) -> impl Iterator<Item = String> {
    list.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

#[test]
#[serial]
fn test_flags_override_environment() {
    clear_env();
    std::env::set_var("SDUI_BFF_URL", "http://env:3000");
    std::env::set_var("SDUI_INITIAL_SCREEN", "OtpScreen");

    let command = parse_args(args(&[
        "sdui",
        "--url",
        "https://bff.example",
        "--texts=texts.json",
    ]))
    .unwrap();
    let options = match command {
        CliCommand::Run(options) => options,
        other => panic!("expected run command, got {:?}", other),
    };
    let config = options.apply(AppConfig::from_env());
    clear_env();

    assert_eq!(config.base_url, "https://bff.example");
    assert_eq!(config.initial_screen, "OtpScreen");
    assert_eq!(config.texts_path, Some(PathBuf::from("texts.json")));
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_bad_url_rejected() {
    clear_env();
    std::env::set_var("SDUI_BFF_URL", "bff:3000");
    let config = AppConfig::from_env();
    clear_env();

    assert!(config.validate().is_err());
}

#[test]
fn test_text_catalog_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "screens": {{"OtpScreen": {{"title": "Tu código"}}}},
            "errors": {{"network": "Sin conexión"}}
        }}"#
    )
    .unwrap();

    let texts = TextCatalog::load(file.path()).unwrap();
    assert_eq!(texts.screen_text("OtpScreen", "title"), Some("Tu código"));
    assert_eq!(texts.error_text("timeout"), Some("Sin conexión"));
}

#[test]
fn test_missing_text_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = TextCatalog::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.context().is_some());
}
