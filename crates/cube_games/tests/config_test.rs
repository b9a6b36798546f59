//! Tests for loading game configuration.

use cube_games::{GameConfig, Identity, Plan, gate_from_config};
use cube_tictactoe::Difficulty;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_full_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
ai_move_delay_ms = 250
win_display_ms = 1000
draw_display_ms = 800
default_difficulty = "hard"
local_names = ["Red", "Blue"]
ai_names = ["Human", "Robot"]
checkout_base_url = "https://example.test/checkout"
"#
    )
    .unwrap();

    let config = GameConfig::from_file(file.path()).unwrap();
    assert_eq!(config.ai_move_delay(), Duration::from_millis(250));
    assert_eq!(config.win_display(), Duration::from_millis(1000));
    assert_eq!(config.draw_display(), Duration::from_millis(800));
    assert_eq!(*config.default_difficulty(), Difficulty::Hard);
    assert_eq!(config.local_names()[1], "Blue");
    assert_eq!(config.ai_names()[1], "Robot");
    assert_eq!(config.checkout_base_url(), "https://example.test/checkout");
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let config = GameConfig::from_file(file.path()).unwrap();
    assert_eq!(config, GameConfig::default());
    assert_eq!(*config.ai_move_delay_ms(), 500);
    assert_eq!(*config.win_display_ms(), 5000);
    assert_eq!(*config.draw_display_ms(), 3000);
    assert_eq!(*config.default_difficulty(), Difficulty::Medium);
    assert_eq!(config.local_names()[0], "Player 1");
}

#[test]
fn test_invalid_config_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "default_difficulty = \"impossible\"").unwrap();
    let err = GameConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.starts_with("Failed to parse config"));

    let missing = GameConfig::from_file("/definitely/not/here.toml").unwrap_err();
    assert!(missing.message.starts_with("Failed to read config file"));
}

#[test]
fn test_instant_config_has_no_delays() {
    let config = GameConfig::instant();
    assert_eq!(config.ai_move_delay(), Duration::ZERO);
    assert_eq!(config.win_display(), Duration::ZERO);
    assert_eq!(config.draw_display(), Duration::ZERO);
    assert_eq!(config.ai_names(), GameConfig::default().ai_names());
}

#[tokio::test]
async fn test_gate_follows_config() {
    let open = gate_from_config(&GameConfig::default());
    assert!(open.is_entitled(None).await);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
require_subscription = true
checkout_base_url = "https://example.test/checkout"
"#
    )
    .unwrap();
    let config = GameConfig::from_file(file.path()).unwrap();
    let gate = gate_from_config(&config);

    assert!(!gate.is_entitled(None).await);
    let url = gate
        .start_checkout(Some(&Identity::new("u7")), Plan::Monthly)
        .await
        .unwrap();
    assert_eq!(url, "https://example.test/checkout?plan=monthly&user=u7");
}
