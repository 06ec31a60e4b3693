//! Support for `-c key=value` overrides shared across MQL CLI tools.
//!
//! Each override is a dotted path into the configuration table and a value
//! written as TOML. A value that does not parse as TOML is taken as a plain
//! string, so `-c wine_path=/opt/wine/bin/wine` works without quoting.

use clap::ArgAction;
use clap::Parser;
use toml::Value;

/// CLI option that captures arbitrary configuration overrides specified as
/// `-c key=value`. Keys use dot notation and values are parsed as TOML.
#[derive(Parser, Debug, Default, Clone)]
pub struct CliConfigOverrides {
    /// Override a configuration value that would otherwise be loaded from
    /// `~/.mql/config.toml` or `mql.toml`. Use a dotted path
    /// (`foo.bar.baz`) to override nested values. The `value` portion is
    /// parsed as TOML. If it fails to parse as TOML, the raw string is used
    /// as a literal.
    ///
    /// Examples:
    ///   - `-c retain_compilation_log_file=true`
    ///   - `-c metaeditor5_path="C:/Program Files/MetaTrader 5/metaeditor64.exe"`
    #[arg(
        short = 'c',
        long = "config",
        value_name = "key=value",
        action = ArgAction::Append,
        global = true,
    )]
    pub raw_overrides: Vec<String>,
}

impl CliConfigOverrides {
    /// Parse the raw strings captured from the CLI into `(path, value)`
    /// tuples, in the order they were given.
    pub fn parse_overrides(&self) -> Result<Vec<(String, Value)>, String> {
        self.raw_overrides
            .iter()
            .map(String::as_str)
            .map(parse_override)
            .collect()
    }
}

fn parse_override(raw: &str) -> Result<(String, Value), String> {
    let Some((key, value_str)) = raw.split_once('=') else {
        return Err(format!("Invalid override (missing '='): {raw}"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Empty key in override: {raw}"));
    }
    if key.split('.').any(str::is_empty) {
        return Err(format!("Invalid key in override: {raw}"));
    }

    let value_str = value_str.trim();
    let value = parse_toml_value(value_str).unwrap_or_else(|| {
        // Treat as a string, dropping surrounding quotes.
        let trimmed = value_str.trim_matches(|c| c == '"' || c == '\'');
        Value::String(trimmed.to_string())
    });
    Ok((key.to_string(), value))
}

/// Parse `raw` as a standalone TOML value by wrapping it in a sentinel
/// table.
fn parse_toml_value(raw: &str) -> Option<Value> {
    let wrapped = format!("_x_ = {raw}");
    let mut table: toml::Table = toml::from_str(&wrapped).ok()?;
    table.remove("_x_")
}
