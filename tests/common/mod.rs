use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use mnemo::config::Config;
use mnemo::memory::HybridMemory;
use mnemo::storage::SqliteStore;
use mnemo::summarizer::HeuristicSummarizer;

#[allow(dead_code)]
pub fn create_temp_store() -> (Arc<SqliteStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("memory.db");
    let store = Arc::new(SqliteStore::new(db_path).expect("failed to create sqlite store"));
    (store, tmp)
}

/// Build a memory engine over a fresh temp database
///
/// Uses the heuristic summarizer so no network is involved. The config is
/// returned so callers can open a second engine over the same database.
#[allow(dead_code)]
pub fn create_temp_memory(summary_threshold: u64) -> (HybridMemory, Config, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let mut config = Config::default();
    config.storage.path = Some(tmp.path().join("memory.db"));
    config.memory.summary_threshold = summary_threshold;

    let memory = open_memory(&config);
    (memory, config, tmp)
}

/// Open a memory engine over the database named in `config`
#[allow(dead_code)]
pub fn open_memory(config: &Config) -> HybridMemory {
    let db_path = config
        .storage
        .resolve_path()
        .expect("failed to resolve db path");
    let store = Arc::new(SqliteStore::new(db_path).expect("failed to create sqlite store"));
    let summarizer = Box::new(HeuristicSummarizer::new(config.memory.summary_max_tokens));
    HybridMemory::new(store, summarizer, config)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
