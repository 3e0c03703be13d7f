use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tessera_http::{parse_byte_size, HttpConfig};

// ── Byte sizes ───────────────────────────────────────────────────

#[test]
fn plain_numbers_are_bytes() {
    assert_eq!(parse_byte_size("0").unwrap(), 0);
    assert_eq!(parse_byte_size("512").unwrap(), 512);
    assert_eq!(parse_byte_size("512b").unwrap(), 512);
}

#[test]
fn units_are_powers_of_1024() {
    assert_eq!(parse_byte_size("1k").unwrap(), 1024);
    assert_eq!(parse_byte_size("1m").unwrap(), 1024 * 1024);
    assert_eq!(parse_byte_size("2g").unwrap(), 2 * 1024 * 1024 * 1024);
}

#[test]
fn units_ignore_case_spacing_and_trailing_b() {
    assert_eq!(parse_byte_size("1M").unwrap(), 1 << 20);
    assert_eq!(parse_byte_size(" 10 MB ").unwrap(), 10 << 20);
    assert_eq!(parse_byte_size("4kb").unwrap(), 4096);
}

#[test]
fn malformed_sizes_are_errors() {
    for text in ["", "b", "m", "1.5m", "-1k", "ten", "1t", "1bb", "k1"] {
        assert!(parse_byte_size(text).is_err(), "{text:?} should not parse");
    }
}

#[test]
fn overflowing_sizes_are_errors() {
    assert!(parse_byte_size("99999999999999999999").is_err());
    assert!(parse_byte_size("17179869184g").is_err());
}

// ── HttpConfig ───────────────────────────────────────────────────

#[test]
fn defaults() {
    let config = HttpConfig::default();
    assert!(!config.allow_jsp);
    assert_eq!(config.upload_max_size, "1m");
    assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    assert_eq!(config.temp_dir, None);
    assert_eq!(config.upload_limit().unwrap(), 1 << 20);
}

#[test]
fn empty_json_takes_defaults() {
    let config = HttpConfig::from_json_str("{}").unwrap();
    assert_eq!(config, HttpConfig::default());
}

#[test]
fn json_overrides() {
    let config = HttpConfig::from_json_str(
        r#"{
            "allow_jsp": true,
            "upload_max_size": "20m",
            "upload_dir": "/srv/files",
            "temp_dir": "/tmp/spool"
        }"#,
    )
    .unwrap();
    assert!(config.allow_jsp);
    assert_eq!(config.upload_limit().unwrap(), 20 << 20);
    assert_eq!(config.upload_dir, PathBuf::from("/srv/files"));
    assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/spool")));
}

#[test]
fn invalid_json_is_a_config_error() {
    let err = HttpConfig::from_json_str(r#"{"allow_jsp": "sometimes"}"#).unwrap_err();
    assert!(err.to_string().starts_with("configuration error"));
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tessera.json");
    std::fs::write(&path, r#"{"upload_max_size": "256k"}"#).unwrap();

    let config = HttpConfig::load(&path).unwrap();
    assert_eq!(config.upload_limit().unwrap(), 256 * 1024);
    assert!(!config.allow_jsp);
}

#[test]
fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(HttpConfig::load(&dir.path().join("absent.json")).is_err());
}
