use std::path::PathBuf;

use prehospital_api::config::Config;

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

const SECRET: (&str, &str) = ("PREHOSPITAL_SESSION_SECRET", "0123456789abcdef0123456789abcdef");

#[test]
fn defaults_apply_when_only_the_secret_is_set() {
    let config = Config::from_lookup(lookup(&[SECRET])).unwrap();

    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(config.database_path, PathBuf::from("prehospital.db"));
    assert_eq!(config.session_ttl, jiff::SignedDuration::from_hours(8));
    assert_eq!(config.limits.max_injuries, 100);
    assert_eq!(config.limits.max_submissions_per_day, 50);
    assert_eq!(config.login_attempts_per_hour, 20);
    assert!(config.bootstrap_admin.is_none());
}

#[test]
fn missing_secret_is_an_error() {
    assert!(Config::from_lookup(lookup(&[])).is_err());
    assert!(Config::from_lookup(lookup(&[("PREHOSPITAL_SESSION_SECRET", "  ")])).is_err());
}

#[test]
fn overrides_are_parsed() {
    let config = Config::from_lookup(lookup(&[
        SECRET,
        ("PREHOSPITAL_BIND_ADDR", "127.0.0.1:9000"),
        ("PREHOSPITAL_DATABASE_PATH", "/var/lib/prehospital/intake.db"),
        ("PREHOSPITAL_SESSION_TTL_SECS", "600"),
        ("PREHOSPITAL_MAX_INJURIES", "25"),
        ("PREHOSPITAL_MAX_SUBMISSIONS_PER_DAY", "5"),
        ("PREHOSPITAL_BOOTSTRAP_ADMIN", "chief"),
        ("PREHOSPITAL_BOOTSTRAP_PASSWORD", "change-me-now"),
    ]))
    .unwrap();

    assert_eq!(config.bind_addr.port(), 9000);
    assert_eq!(config.session_ttl, jiff::SignedDuration::from_secs(600));
    assert_eq!(config.limits.max_injuries, 25);
    assert_eq!(config.limits.max_submissions_per_day, 5);
    assert_eq!(config.bootstrap_admin.as_ref().unwrap().username, "chief");
    assert!(!format!("{config:?}").contains("change-me-now"));
    assert!(!format!("{config:?}").contains("0123456789abcdef"));
}

#[test]
fn invalid_values_are_errors() {
    for (key, value) in [
        ("PREHOSPITAL_BIND_ADDR", "not-an-addr"),
        ("PREHOSPITAL_MAX_INJURIES", "-1"),
        ("PREHOSPITAL_SESSION_TTL_SECS", "0"),
        ("PREHOSPITAL_BOOTSTRAP_ADMIN", "chief"),
    ] {
        let result = Config::from_lookup(lookup(&[SECRET, (key, value)]));
        assert!(result.is_err(), "{key}={value} accepted");
    }
}
