use anyhow::{Context, Result};
use std::path::Path;
use tessera_query::SparqlConfig;

/// Load the compiler configuration, applying CLI overrides on top.
///
/// Without a file every field takes its default; a file may set any subset.
pub fn load(config_file: Option<&Path>, scheme: Option<String>) -> Result<SparqlConfig> {
    let mut config = match config_file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => SparqlConfig::default(),
    };

    if let Some(scheme) = scheme {
        config.scheme = scheme;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        assert_eq!(load(None, None).unwrap(), SparqlConfig::default());
    }

    #[test]
    fn test_file_values_and_scheme_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scheme = \"zest\"\nidentity_name = \"id\"").unwrap();

        let config = load(Some(file.path()), None).unwrap();
        assert_eq!(config.scheme, "zest");
        assert_eq!(config.identity_name, "id");

        let config = load(Some(file.path()), Some("other".to_string())).unwrap();
        assert_eq!(config.scheme, "other");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load(Some(Path::new("/nonexistent/tessera.toml")), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tessera.toml"));
    }
}
