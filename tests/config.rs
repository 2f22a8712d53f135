use pretty_assertions::assert_eq;
use titan_smp::search::{SearchConfig, SearchTuning, ThreadPool};
use titan_smp::EngineError;

#[test]
fn json_file_round_trip() {
    let cfg = SearchConfig {
        threads: 3,
        hash_mb: 32,
        tuning: SearchTuning { null_move_base_reduction: 4, check_extension: false, ..Default::default() },
        ..Default::default()
    };
    let path = std::env::temp_dir().join(format!("titan-smp-config-{}.json", std::process::id()));
    std::fs::write(&path, cfg.to_json_pretty().unwrap()).unwrap();
    let loaded = SearchConfig::from_json_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, cfg);
}

#[test]
fn missing_file_is_a_config_error() {
    let err = SearchConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn pool_rejects_invalid_config() {
    let bad = SearchConfig { check_interval_nodes: 0, ..Default::default() };
    assert!(matches!(ThreadPool::new(bad), Err(EngineError::Config(_))));
    let bad = SearchConfig { threads: 0, ..Default::default() };
    assert!(matches!(ThreadPool::new(bad), Err(EngineError::Config(_))));
}
