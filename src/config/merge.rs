use super::{Config, ConfigLayer, ConnDefaults};

/// Fold the file layers over the built-in defaults, lowest first.
pub fn merge_layers(user: Option<ConfigLayer>, rc: Option<ConnDefaults>) -> Config {
    let mut config = Config::default();
    if let Some(layer) = user {
        layer.apply_to(&mut config);
    }
    if let Some(rc) = rc {
        rc.apply_to(&mut config.connection);
    }
    config
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

fn apply_overrides_from(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| {
        var(key)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(host) = non_empty("KVC_HOST") {
        config.connection.host = Some(host);
    }

    if let Some(bucket) = non_empty("KVC_BUCKET") {
        config.connection.bucket = Some(bucket);
    }

    if let Some(raw) = non_empty("KVC_TIMEOUT") {
        match raw.parse::<u32>() {
            Ok(value) => {
                config.connection.timeout = Some(value);
            }
            Err(err) => {
                tracing::warn!("invalid KVC_TIMEOUT, ignoring: {err}");
            }
        }
    }
}
