// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn empty_document_uses_defaults() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.binary_path, PathBuf::from("borg"));
    assert_eq!(config.mount_binary(), Path::new("borg"));
    assert_eq!(config.auth.max_retries, 20);
    assert_eq!(config.auth.retry_interval, Duration::from_secs(30));
    assert_eq!(config.auth.session_lifetime, Duration::from_secs(600));
}

#[test]
fn durations_use_humantime() {
    let config = EngineConfig::from_toml_str(
        r#"
binary_path = "/opt/borg/bin/borg"
mount_binary_path = "/opt/borg/bin/borg-fuse"
ssh_private_keys = ["/home/u/.ssh/id_ed25519"]
termination_grace = "5s"

[auth]
retry_interval = "2s"
max_retries = 3
session_lifetime = "1m 30s"
gc_delay = "10m"
"#,
    )
    .unwrap();
    assert_eq!(config.mount_binary(), Path::new("/opt/borg/bin/borg-fuse"));
    assert_eq!(config.termination_grace, Duration::from_secs(5));
    assert_eq!(config.auth.session_lifetime, Duration::from_secs(90));
    assert_eq!(config.auth.gc_delay, Duration::from_secs(600));
    assert_eq!(config.ssh_private_keys.len(), 1);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = EngineConfig::from_toml_str("binary = \"borg\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "binary_path = \"/usr/local/bin/borg\"").unwrap();
    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.binary_path, PathBuf::from("/usr/local/bin/borg"));
}

#[test]
fn missing_file_reports_path() {
    let err = EngineConfig::load(Path::new("/nonexistent/arco.toml")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/arco.toml"));
}
