//! Coverage for config parsing, env overrides and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parish_admin::config::{
    config_dir, load_config, resolve_config_path, ApiConfig, Config, ContentBackend,
    UploadConfig, CONFIG_PATH_ENV,
};

fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_owned())
    }
}

#[test]
fn default_api_values() {
    let api = ApiConfig::default();
    assert_eq!(api.base_url, "http://localhost:5000");
    assert_eq!(api.timeout(), Duration::from_secs(15));
}

#[test]
fn default_upload_values() {
    let upload = UploadConfig::default();
    assert_eq!(upload.sources, vec!["local", "camera", "url"]);
    assert_eq!(upload.default_source, "local");
    assert!(!upload.cropping);
}

#[test]
fn default_content_uses_seeded_memory_store() {
    let config = Config::default();
    assert_eq!(config.content.backend, ContentBackend::Memory);
    assert!(config.content.seed_demo);
}

#[test]
fn config_dir_resolves() {
    let path = match config_dir() {
        Ok(path) => path,
        Err(err) => panic!("config dir should resolve: {err}"),
    };
    assert!(path.ends_with(".parish-admin"));
}

#[test]
fn parse_minimal_config() {
    let toml_str = r#"
[api]
base_url = "https://stmarys.example.org"

[inbox]
page_size = 25

[content]
backend = "http"
"#;
    let config = match Config::from_toml(toml_str) {
        Ok(config) => config,
        Err(err) => panic!("minimal config should parse: {err}"),
    };
    assert_eq!(config.api.base_url, "https://stmarys.example.org");
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.inbox.page_size, 25);
    assert_eq!(config.inbox.search_debounce_ms, 300);
    assert_eq!(config.content.backend, ContentBackend::Http);
    assert!(config.validate().is_ok());
}

#[test]
fn parse_rejects_unknown_backend() {
    let result = Config::from_toml("[content]\nbackend = \"sqlite\"\n");
    assert!(result.is_err());
}

#[test]
fn env_overrides_take_precedence() {
    let mut config = Config::default();
    config.apply_overrides(env_from(&[
        ("PARISH_API_URL", "https://api.example.org/v2"),
        ("PARISH_PAGE_SIZE", "5"),
        ("PARISH_CONTENT_BACKEND", "HTTP"),
    ]));
    assert_eq!(config.api.base_url, "https://api.example.org/v2");
    assert_eq!(config.inbox.page_size, 5);
    assert_eq!(config.content.backend, ContentBackend::Http);
}

#[test]
fn invalid_env_overrides_are_ignored() {
    let mut config = Config::default();
    config.apply_overrides(env_from(&[
        ("PARISH_PAGE_SIZE", "lots"),
        ("PARISH_CONTENT_BACKEND", "postgres"),
    ]));
    assert_eq!(config.inbox.page_size, 10);
    assert_eq!(config.content.backend, ContentBackend::Memory);
}

#[test]
fn validate_rejects_zero_page_size() {
    let mut config = Config::default();
    config.inbox.page_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_relative_base_url() {
    let mut config = Config::default();
    config.api.base_url = "not a url".to_owned();
    assert!(config.validate().is_err());
}

#[test]
fn base_url_keeps_path_prefix() {
    let api = ApiConfig {
        base_url: "https://example.org/parish".to_owned(),
        timeout_secs: 3,
    };
    let base = match api.base() {
        Ok(base) => base,
        Err(err) => panic!("base should parse: {err}"),
    };
    assert_eq!(base.as_str(), "https://example.org/parish/");
}

#[test]
fn missing_file_yields_defaults() {
    let tmp = match tempfile::tempdir() {
        Ok(tmp) => tmp,
        Err(err) => panic!("should create temp dir: {err}"),
    };
    let config = match load_config(&tmp.path().join("absent.toml")) {
        Ok(config) => config,
        Err(err) => panic!("missing file should not be an error: {err}"),
    };
    assert_eq!(config, Config::default());
}

#[test]
fn malformed_file_is_an_error() {
    let tmp = match tempfile::tempdir() {
        Ok(tmp) => tmp,
        Err(err) => panic!("should create temp dir: {err}"),
    };
    let path = tmp.path().join("config.toml");
    if let Err(err) = std::fs::write(&path, "[inbox\npage_size = ") {
        panic!("should write config: {err}");
    }
    assert!(load_config(&path).is_err());
}

#[test]
fn rendered_config_loads_back_unchanged() {
    let tmp = match tempfile::tempdir() {
        Ok(tmp) => tmp,
        Err(err) => panic!("should create temp dir: {err}"),
    };
    let mut config = Config::default();
    config.upload.cloud_name = "stmarys".to_owned();
    config.inbox.page_size = 20;

    let rendered = match config.to_toml() {
        Ok(rendered) => rendered,
        Err(err) => panic!("config should render: {err}"),
    };
    let path = tmp.path().join("config.toml");
    if let Err(err) = std::fs::write(&path, rendered) {
        panic!("should write config: {err}");
    }
    let loaded = match load_config(&path) {
        Ok(loaded) => loaded,
        Err(err) => panic!("rendered config should load: {err}"),
    };
    assert_eq!(loaded, config);
}

#[test]
fn explicit_path_beats_env() {
    let explicit = Path::new("/tmp/explicit.toml");
    let resolved = resolve_config_path(
        Some(explicit),
        env_from(&[(CONFIG_PATH_ENV, "/tmp/from-env.toml")]),
    );
    assert!(matches!(resolved, Ok(ref p) if p == explicit));
}

#[test]
fn env_path_beats_default() {
    let resolved = resolve_config_path(None, env_from(&[(CONFIG_PATH_ENV, "/tmp/from-env.toml")]));
    assert!(matches!(resolved, Ok(ref p) if *p == PathBuf::from("/tmp/from-env.toml")));
}

#[test]
fn default_path_is_under_config_dir() {
    let resolved = match resolve_config_path(None, |_| None) {
        Ok(path) => path,
        Err(err) => panic!("default path should resolve: {err}"),
    };
    assert!(resolved.ends_with(".parish-admin/config.toml"));
}
