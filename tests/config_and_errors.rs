// tests/config_and_errors.rs

mod common;
use crate::common::{GraphBuilder, init_tracing, t0};

use std::path::{Path, PathBuf};
use std::time::Duration;

use mindchain::config::loader::load_with_fs;
use mindchain::config::{ConfigFile, RawConfigFile, load_and_validate, load_or_default};
use mindchain::engine::TimerSettings;
use mindchain::errors::MindChainError;
use mindchain::fs::mock::MockFileSystem;
use mindchain::graph::{PriorityDefaults, recompute};

fn parse(toml_text: &str) -> Result<ConfigFile, MindChainError> {
    let fs = MockFileSystem::new();
    fs.add_file("cfg.toml", toml_text);
    ConfigFile::try_from(load_with_fs(&fs, "cfg.toml")?)
}

#[test]
fn empty_file_yields_defaults() {
    let config = parse("").unwrap();

    assert_eq!(config, ConfigFile::default());
    assert_eq!(config.store_path, PathBuf::from("mindchain.json"));
    assert_eq!(config.timers, TimerSettings::default());
    assert_eq!(config.timers.deadline_interval, Duration::from_secs(30));
    assert_eq!(config.timers.autosave_interval, Duration::from_secs(30 * 60));
}

#[test]
fn every_section_can_be_overridden() {
    let config = parse(
        r#"
        [store]
        path = "notes/work.json"

        [timers]
        autosave_interval = "5m"
        deadline_interval = "500ms"

        [priority]
        executable_default = 80
        blocked_default = 20
        "#,
    )
    .unwrap();

    assert_eq!(config.store_path, PathBuf::from("notes/work.json"));
    assert_eq!(config.timers.autosave_interval, Duration::from_secs(300));
    assert_eq!(config.timers.deadline_interval, Duration::from_millis(500));
    assert_eq!(
        config.priority,
        PriorityDefaults {
            executable_default: 80,
            blocked_default: 20
        }
    );
}

#[test]
fn partial_priority_section_keeps_other_default() {
    let config = parse("[priority]\nblocked_default = 10\n").unwrap();

    assert_eq!(config.priority.executable_default, 100);
    assert_eq!(config.priority.blocked_default, 10);
}

#[test]
fn invalid_values_are_config_errors() {
    for text in [
        "[store]\npath = \"  \"\n",
        "[timers]\nautosave_interval = \"0s\"\n",
        "[timers]\ndeadline_interval = \"soon\"\n",
        "[timers]\ndeadline_interval = \"3d\"\n",
        "[priority]\nexecutable_default = 0\n",
    ] {
        let err = parse(text).unwrap_err();
        assert!(
            matches!(err, MindChainError::ConfigError(_)),
            "expected ConfigError for {text:?}, got {err:?}"
        );
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let err = parse("[timers\nautosave_interval = 1").unwrap_err();
    assert!(matches!(err, MindChainError::TomlError(_)));
}

#[test]
fn missing_default_file_falls_back_to_defaults() {
    init_tracing();
    let fs = MockFileSystem::new();

    let config = load_or_default(&fs, None).unwrap();

    assert_eq!(config, ConfigFile::default());
}

#[test]
fn default_file_is_picked_up_when_present() {
    let fs = MockFileSystem::new();
    fs.add_file("MindChain.toml", "[store]\npath = \"other.json\"\n");

    let config = load_or_default(&fs, None).unwrap();

    assert_eq!(config.store_path, PathBuf::from("other.json"));
}

#[test]
fn explicit_config_path_must_exist() {
    let fs = MockFileSystem::new();
    let err = load_or_default(&fs, Some(Path::new("missing.toml"))).unwrap_err();
    assert!(matches!(err, MindChainError::Other(_)));
}

#[test]
fn config_loads_from_a_real_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MindChain.toml");
    std::fs::write(&path, "[timers]\ndeadline_interval = \"10s\"\n").unwrap();

    let config = load_and_validate(&path).unwrap();

    assert_eq!(config.timers.deadline_interval, Duration::from_secs(10));
}

#[test]
fn raw_config_default_matches_validated_default() {
    let validated = ConfigFile::try_from(RawConfigFile::default()).unwrap();
    assert_eq!(validated, ConfigFile::default());
}

#[test]
fn disconnected_node_is_reported() {
    let raw = GraphBuilder::new("island")
        .edge(0, 1)
        .node(5, "floating")
        .build_raw();

    let err = recompute(&raw, t0(), &PriorityDefaults::default()).unwrap_err();

    assert!(matches!(err, MindChainError::DisconnectedNode(5)));
}

#[test]
fn cycle_is_reported() {
    let raw = GraphBuilder::new("loop")
        .edge(0, 1)
        .edge(1, 2)
        .edge(2, 3)
        .edge(3, 1)
        .build_raw();

    let err = recompute(&raw, t0(), &PriorityDefaults::default()).unwrap_err();

    assert!(matches!(err, MindChainError::GraphCycle(_)));
}

#[test]
fn error_messages_name_the_node() {
    assert_eq!(
        MindChainError::InvalidReference(7).to_string(),
        "Node not found: 7"
    );
    assert_eq!(
        MindChainError::DisconnectedNode(3).to_string(),
        "Node 3 is not reachable from the root"
    );
}
