use anyhow::{Context, Result};
use sense_graph::DisambiguationConfig;
use serde::Deserialize;
use std::path::Path;

pub(crate) const CONFIG_ENV: &str = "SENSE_FINDER_CONFIG";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    disambiguation: DisambiguationConfig,
}

/// Command-line overrides, applied on top of the config file
#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigOverrides {
    pub max_depth: Option<usize>,
    pub min_degree: Option<usize>,
    pub max_edges: Option<usize>,
    pub max_expansions: Option<usize>,
    pub timeout_ms: Option<u64>,
}

pub(crate) fn parse_config(text: &str) -> Result<DisambiguationConfig> {
    let file: FileConfig = toml::from_str(text)?;
    Ok(file.disambiguation)
}

/// Defaults, then the config file (explicit path or `SENSE_FINDER_CONFIG`),
/// then flags. The result is validated.
pub(crate) fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<DisambiguationConfig> {
    let env_path = std::env::var_os(CONFIG_ENV);
    let path = path.or(env_path.as_deref().map(Path::new));

    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            parse_config(&text).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => DisambiguationConfig::default(),
    };

    if let Some(v) = overrides.max_depth {
        config.max_depth = v;
    }
    if let Some(v) = overrides.min_degree {
        config.min_degree = v;
    }
    if overrides.max_edges.is_some() {
        config.max_edges = overrides.max_edges;
    }
    if overrides.max_expansions.is_some() {
        config.max_expansions = overrides.max_expansions;
    }
    if overrides.timeout_ms.is_some() {
        config.timeout_ms = overrides.timeout_ms;
    }

    config.validate()?;
    log::debug!("Effective config: {config:?}");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_disambiguation_table() {
        let config = parse_config(
            r#"
            [disambiguation]
            max_depth = 3
            timeout_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.max_depth, 3);
        assert_eq!(config.min_degree, 1);
        assert_eq!(config.timeout_ms, Some(500));
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), DisambiguationConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_config("[disambiguation]\ndepth = 3\n").is_err());
        assert!(parse_config("[search]\nlimit = 3\n").is_err());
    }

    #[test]
    fn overrides_win_and_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sense.toml");
        std::fs::write(&path, "[disambiguation]\nmax_depth = 3\nmin_degree = 2\n").unwrap();

        let overrides = ConfigOverrides {
            min_degree: Some(0),
            ..Default::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.min_degree, 0);

        let invalid = ConfigOverrides {
            max_depth: Some(0),
            ..Default::default()
        };
        assert!(load_config(Some(&path), &invalid).is_err());
    }
}
