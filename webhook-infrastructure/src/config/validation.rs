use anyhow::{anyhow, Result};

/// Provider names appear as a single path segment.
pub fn validate_provider_name(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("provider name is empty"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!("provider name '{}' must be [A-Za-z0-9_-]", value));
    }
    Ok(())
}

/// Accepts `true`, `1` and `yes` in any case as enabled.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
