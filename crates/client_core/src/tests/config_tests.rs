use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_middleware() {
    let settings = ClientSettings::default();
    assert_eq!(settings.base_url, "http://127.0.0.1:8082");
    assert_eq!(settings.progress_ordering, ProgressOrdering::Sequenced);
    assert!(!settings.electrum_connect_enabled);
    assert_eq!(settings.request_timeout(), Duration::from_secs(60));
}

#[test]
fn env_overrides_replace_file_values() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup(&[
            ("BASECTL_BASE_URL", "https://base.local"),
            ("BASECTL_API_PREFIX", "bitboxbases/abc"),
            ("BASECTL_REQUEST_TIMEOUT_SECS", "15"),
            ("BASECTL_PROGRESS_ORDERING", "last-write-wins"),
            ("BASECTL_ELECTRUM_CONNECT", "true"),
        ]),
    );

    assert_eq!(
        settings,
        ClientSettings {
            base_url: "https://base.local".into(),
            api_prefix: "bitboxbases/abc".into(),
            request_timeout_secs: 15,
            progress_ordering: ProgressOrdering::LastWriteWins,
            electrum_connect_enabled: true,
        }
    );
}

#[test]
fn invalid_env_values_are_ignored() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup(&[
            ("BASECTL_REQUEST_TIMEOUT_SECS", "soon"),
            ("BASECTL_PROGRESS_ORDERING", "random"),
            ("BASECTL_ELECTRUM_CONNECT", "maybe"),
        ]),
    );

    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn zero_timeout_is_raised_to_one_second() {
    let settings = ClientSettings {
        request_timeout_secs: 0,
        ..ClientSettings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
}

#[test]
fn reads_partial_settings_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("basectl_settings_test_{suffix}.toml"));
    fs::write(
        &path,
        "base_url = \"http://10.0.0.5:8082\"\nprogress_ordering = \"last-write-wins\"\n",
    )
    .expect("write settings");

    let settings = read_settings_file(&path).expect("parse");

    assert_eq!(settings.base_url, "http://10.0.0.5:8082");
    assert_eq!(settings.progress_ordering, ProgressOrdering::LastWriteWins);
    assert_eq!(settings.api_prefix, ClientSettings::default().api_prefix);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_explicit_settings_file_is_an_error() {
    let err = load_settings(Some(Path::new("/nonexistent/basectl.toml")))
        .expect_err("missing file");
    assert!(err.to_string().contains("failed to read settings file"));
}
