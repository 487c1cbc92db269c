//! Property-based tests for the pure helpers behind the workflows.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use serde_json::json;

use spinwick_cli::domain::SpinwickConfig;
use spinwick_cli::domain::bootstrap::{EmailRelay, apply_profile};
use spinwick_cli::infra::http::join;
use spinwick_cli::infra::registry::parse_bearer_challenge;

fn relay() -> EmailRelay {
    EmailRelay {
        username: "relay-user".to_string(),
        password: "relay-pass".to_string(),
        server: "smtp.example.com".to_string(),
    }
}

proptest! {
    /// The profile never drops settings it does not manage.
    #[test]
    fn prop_profile_keeps_unrelated_settings(key in "[A-Z][a-zA-Z]{2,20}", value in "[a-z0-9]{0,20}") {
        prop_assume!(!["TeamSettings", "PluginSettings", "ServiceSettings", "LogSettings",
            "EmailSettings", "LdapSettings"].contains(&key.as_str()));
        let mut config = serde_json::Value::Object(serde_json::Map::new());
        config[key.as_str()] = json!({ "Value": value.clone() });
        apply_profile(&mut config, &relay());
        prop_assert_eq!(&config[&key]["Value"], &json!(value));
        prop_assert_eq!(&config["EmailSettings"]["SMTPServer"], &json!("smtp.example.com"));
    }

    /// Applying the profile twice changes nothing.
    #[test]
    fn prop_profile_is_idempotent(site in "[a-z]{1,12}") {
        let mut once = json!({ "ServiceSettings": { "SiteURL": format!("https://{site}") } });
        apply_profile(&mut once, &relay());
        let mut twice = once.clone();
        apply_profile(&mut twice, &relay());
        prop_assert_eq!(once, twice);
    }

    /// Joined URLs have exactly one slash at the seam.
    #[test]
    fn prop_join_has_single_seam(
        base in "http://[a-z]{1,10}(:[0-9]{2,4})?/{0,3}",
        path in "/{0,3}[a-z0-9/]{0,20}",
    ) {
        let url = join(&base, &path);
        let host_end = base.trim_end_matches('/').len();
        prop_assert_eq!(&url[..host_end], base.trim_end_matches('/'));
        prop_assert!(url[host_end..].starts_with('/'));
        prop_assert!(!url[host_end + 1..].starts_with('/'));
    }

    /// Any quoted realm survives challenge parsing.
    #[test]
    fn prop_challenge_realm_roundtrips(realm in "https://[a-z]{1,12}\\.example\\.com/[a-z]{0,8}", scope in "[a-z:/]{1,30}") {
        let header = format!(r#"Bearer realm="{realm}",service="svc",scope="{scope}""#);
        let challenge = parse_bearer_challenge(&header).unwrap();
        prop_assert_eq!(challenge.realm, realm);
        prop_assert_eq!(challenge.scope, Some(scope));
    }
}

#[test]
fn default_config_survives_yaml_roundtrip() {
    let yaml = serde_yaml::to_string(&SpinwickConfig::default()).unwrap();
    let parsed: SpinwickConfig = serde_yaml::from_str(&yaml).unwrap();
    parsed.validate().unwrap();
    assert_eq!(parsed.sizes.installation, "miniSingleton");
    assert_eq!(parsed.timing.cluster.timeout_secs, 900);
}
