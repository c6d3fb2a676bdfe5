use crate::config::Config;
use crate::error::ConfigError;

fn parse_error(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Parse(e.to_string())
}

/// Apply an overlay TOML fragment on top of `base`.
///
/// Keys present in the overlay win; everything else keeps its `base`
/// value. Both sides are turned into [`toml::Value`] tables, deep-merged,
/// then deserialized back into a [`Config`].
pub fn merge_configs(base: &Config, overlay_toml: &str) -> Result<Config, ConfigError> {
    let base_text = toml::to_string(base).map_err(parse_error)?;
    let mut merged: toml::Value = toml::from_str(&base_text).map_err(parse_error)?;
    let overlay: toml::Value = toml::from_str(overlay_toml).map_err(parse_error)?;

    merge_values(&mut merged, overlay);

    merged
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(e))
}

/// Tables merge key by key; any other value is replaced outright.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, val) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, val),
                    None => {
                        base_table.insert(key, val);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_overlay_returns_base() {
        let base = Config::default();
        assert_eq!(merge_configs(&base, "").unwrap(), base);
    }

    #[test]
    fn overlay_replaces_single_key() {
        let merged = merge_configs(&Config::default(), "[bridge]\nrequest_timeout_secs = 30\n").unwrap();
        assert_eq!(merged.bridge.request_timeout_secs, 30);
        assert_eq!(merged.bridge.endpoint, "ws://localhost:10112/");
    }

    #[test]
    fn overlay_fills_unset_option() {
        let merged = merge_configs(&Config::default(), "[compiler]\nprogram = \"sample\"\n").unwrap();
        assert_eq!(merged.compiler.program, Some(PathBuf::from("sample")));
        assert_eq!(merged.compiler.timeout_secs, 30);
    }

    #[test]
    fn layered_overlays_apply_in_order() {
        let global = merge_configs(
            &Config::default(),
            "[bridge]\nendpoint = \"ws://global:1/\"\nconnect_timeout_secs = 9\n",
        )
        .unwrap();
        let project = merge_configs(&global, "[bridge]\nendpoint = \"ws://project:2/\"\n").unwrap();
        assert_eq!(project.bridge.endpoint, "ws://project:2/");
        assert_eq!(project.bridge.connect_timeout_secs, 9);
    }

    #[test]
    fn arrays_are_replaced_not_appended() {
        let base = merge_configs(&Config::default(), "[compiler]\nargs = [\"-a\", \"-b\"]\n").unwrap();
        let merged = merge_configs(&base, "[compiler]\nargs = [\"-c\"]\n").unwrap();
        assert_eq!(merged.compiler.args, vec!["-c".to_string()]);
    }

    #[test]
    fn wrong_value_type_is_parse_error() {
        let err = merge_configs(&Config::default(), "[bridge]\nrequest_timeout_secs = \"soon\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_overlay_is_parse_error() {
        assert!(merge_configs(&Config::default(), "{{invalid}}").is_err());
    }
}
