use anyhow::{anyhow, Result};

/// Checks that `value` looks like `scheme://host...` with one of the allowed schemes.
pub fn validate_endpoint(name: &str, value: &str, schemes: &[&str]) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} is empty", name));
    }
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return Err(anyhow!("{} must include a scheme", name));
    };
    if !schemes.iter().any(|allowed| allowed.eq_ignore_ascii_case(scheme)) {
        return Err(anyhow!(
            "{} scheme must be one of {}",
            name,
            schemes.join(", ")
        ));
    }
    if rest.trim_start_matches(|c| c == '/').is_empty() {
        return Err(anyhow!("{} is missing a host", name));
    }
    Ok(())
}

/// Database names are spliced into DDL, so only `[A-Za-z0-9_]` is accepted.
pub fn validate_database_name(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow!("clickhouse_database is empty"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(anyhow!("clickhouse_database must be alphanumeric or underscore"));
    }
    Ok(())
}
