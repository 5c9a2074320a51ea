//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Configuration loading and saving
//! - Default configuration generation
//! - Partial and invalid files
//! - Integration with StateManager

use quizforge::models::{CardType, Difficulty, SummaryType};
use quizforge::{AppConfig, ConfigManager, StateManager};
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
    assert_eq!(manager.config_path(), config_path.join("QuizForge.yaml"));
}

#[test]
fn test_config_directory_created() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("QuizForge Data");

    ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
}

#[test]
fn test_load_default_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let config = manager.load_config().unwrap();

    assert_eq!(config.defaults.num_questions, 5);
    assert_eq!(config.defaults.num_cards, 10);
    assert_eq!(config.defaults.subject, "General");
    assert_eq!(config.defaults.difficulty, Difficulty::Medium);
    assert_eq!(config.defaults.summary_type, SummaryType::BulletPoints);
    assert_eq!(config.defaults.card_type, CardType::Mixed);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(
        manager.config_path(),
        "defaults:\n  subject: Organic Chemistry\n  card_type: definition\nlogging:\n  json: true\n",
    )
    .unwrap();

    let config = manager.load_config().unwrap();

    assert_eq!(config.defaults.subject, "Organic Chemistry");
    assert_eq!(config.defaults.card_type, CardType::Definition);
    assert_eq!(config.defaults.num_questions, 5);
    assert!(config.logging.json);
    assert_eq!(config.logging.directory, "logs");
}

#[test]
fn test_save_and_reload_round_trip() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut config = AppConfig::default();
    config.api.timeout_secs = 30;
    config.defaults.num_cards = 25;
    config.defaults.summary_type = SummaryType::Short;
    manager.save_config(&config).unwrap();

    let contents = fs::read_to_string(manager.config_path()).unwrap();
    assert!(contents.contains("summary_type: short"));

    let reloaded = ConfigManager::new(&config_path).unwrap().load_config().unwrap();
    assert_eq!(reloaded.api.timeout_secs, 30);
    assert_eq!(reloaded.defaults.num_cards, 25);
    assert_eq!(reloaded.defaults.summary_type, SummaryType::Short);
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(manager.config_path(), "defaults: [unclosed").unwrap();

    assert!(manager.load_config().is_err());
}

#[test]
fn test_unknown_difficulty_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(manager.config_path(), "defaults:\n  difficulty: impossible\n").unwrap();

    assert!(manager.load_config().is_err());
}

#[test]
fn test_config_defaults_flow_into_state() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(
        manager.config_path(),
        "defaults:\n  num_questions: 12\n  difficulty: hard\n",
    )
    .unwrap();
    let config = manager.load_config().unwrap();

    let state = StateManager::new();
    state.load_from_config(&config);
    state
        .update_options(|o| o.num_questions = 3)
        .unwrap();
    state.reset();

    let options = state.read(|s| s.options.clone());
    assert_eq!(options.num_questions, 12);
    assert_eq!(options.difficulty, Difficulty::Hard);
}
