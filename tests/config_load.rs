use std::io::Write;

use addrmq::config::load_config;
use addrmq::Config;

#[test]
fn load_config_matches_toml() {
    let cfg: Config = load_config("addrmq.toml").expect("failed to load config");

    assert_eq!(cfg.queues.default_wait_ms, 5000);
    assert_eq!(cfg.queues.default_deq_batch, 16);
    assert_eq!(cfg.logging.filter, "info");
}

#[test]
fn partial_toml_is_filled_with_defaults() {
    let path = std::env::temp_dir().join("addrmq-partial-config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "[queues]\ndefault_wait_ms = 250\n").unwrap();

    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.queues.default_wait_ms, 250);
    assert_eq!(cfg.queues.default_deq_batch, 16);
    assert_eq!(cfg.logging.filter, "info");

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_config_file_is_an_error() {
    assert!(load_config("definitely-not-here.toml").is_err());
}
