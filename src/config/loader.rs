//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FormularyConfig;
use super::secret_string;
use crate::domain::errors::FormularyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FormularyConfig
/// 4. Applies environment variable overrides (FORMULARY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file cannot be read or parsed, a
/// referenced environment variable is not set, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use formulary::config::load_config;
///
/// let config = load_config("formulary.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FormularyConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FormularyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FormularyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Same as [`load_config`] for configuration text already in memory
pub fn load_config_str(contents: &str) -> Result<FormularyConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FormularyConfig = toml::from_str(&contents)
        .map_err(|e| FormularyError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FormularyError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn placeholder_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = PATTERN.get() {
        return Ok(re);
    }
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FormularyError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    Ok(PATTERN.get_or_init(|| re))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern()?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FormularyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        FormularyError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using FORMULARY_* prefix
///
/// Environment variables follow the pattern: FORMULARY_<SECTION>_<KEY>
/// For example: FORMULARY_PIPELINE_BATCH_SIZE, FORMULARY_SOURCES_SALES_PATH
fn apply_env_overrides(config: &mut FormularyConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_override("FORMULARY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_override("FORMULARY_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("FORMULARY_APPLICATION_DRY_RUN", &val)?;
    }

    // Pipeline overrides
    if let Some(val) = env_override("FORMULARY_PIPELINE_BATCH_SIZE") {
        config.pipeline.batch_size = parse_override("FORMULARY_PIPELINE_BATCH_SIZE", &val)?;
    }
    if let Some(val) = env_override("FORMULARY_PIPELINE_ENSURE_SCHEMA") {
        config.pipeline.ensure_schema = parse_override("FORMULARY_PIPELINE_ENSURE_SCHEMA", &val)?;
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Some(val) = env_override("FORMULARY_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = env_override("FORMULARY_POSTGRESQL_MAX_CONNECTIONS") {
            pg_config.max_connections = parse_override("FORMULARY_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Some(val) = env_override("FORMULARY_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }

    // Source overrides
    for (name, source) in [
        ("PRODUCTS", &mut config.sources.products),
        ("EXCLUSIVITY", &mut config.sources.exclusivity),
        ("PATENTS", &mut config.sources.patents),
        ("SALES", &mut config.sources.sales),
        ("NDC", &mut config.sources.ndc),
    ] {
        if let Some(val) = env_override(&format!("FORMULARY_SOURCES_{name}_PATH")) {
            source.path = val.into();
        }
        if let Some(val) = env_override(&format!("FORMULARY_SOURCES_{name}_ENCODING")) {
            source.encoding = val;
        }
    }

    // Logging overrides
    if let Some(val) = env_override("FORMULARY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("FORMULARY_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env_override("FORMULARY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MEMORY_CONFIG: &str = r#"
database_target = "memory"

[sources.products]
path = "products.csv"

[sources.exclusivity]
path = "exclusivity.csv"

[sources.patents]
path = "patent.csv"

[sources.sales]
path = "sales.csv"
encoding = "latin1"

[sources.ndc]
path = "ndc.csv"
encoding = "latin1"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FORMULARY_TEST_SUBST_VAR", "test_value");
        let input = "password = \"${FORMULARY_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("FORMULARY_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FORMULARY_TEST_MISSING_VAR");
        let input = "password = \"${FORMULARY_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("FORMULARY_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("FORMULARY_TEST_COMMENTED_VAR");
        let input = "# url = \"${FORMULARY_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(FormularyError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MEMORY_CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.batch_size, 1000);
        assert_eq!(config.sources.sales.encoding, "latin1");
        assert_eq!(config.sources.products.encoding, "utf-8");
        assert!(config.postgresql.is_none());
    }

    #[test]
    fn test_load_config_rejects_bad_batch_size() {
        let contents = format!("{MEMORY_CONFIG}\n[pipeline]\nbatch_size = 0\n");
        let err = load_config_str(&contents).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_parse_override_rejects_garbage() {
        let err = parse_override::<usize>("FORMULARY_PIPELINE_BATCH_SIZE", "lots").unwrap_err();
        assert!(matches!(err, FormularyError::Configuration(_)));
    }
}
