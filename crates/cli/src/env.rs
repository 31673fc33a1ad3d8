use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CliError;

/// The process environment, optionally overlaid with a `.env` style file.
/// Settings read their `PG*` variables from here.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file. Entries in the file win over the
    /// process environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.vars
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}
