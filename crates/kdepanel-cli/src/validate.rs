use std::sync::LazyLock;

use regex::Regex;

use crate::KdeError;

static ENV_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid regex"));
static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid regex"));

/// Environment names may only contain letters, digits, `-` and `_`
pub fn validate_env_name(name: &str) -> Result<(), KdeError> {
    if ENV_NAME.is_match(name) {
        Ok(())
    } else {
        Err(KdeError::InvalidInput(
            "Environment name may only contain letters, digits, '-' and '_'".to_string(),
        ))
    }
}

pub fn validate_project_name(name: &str) -> Result<(), KdeError> {
    if PROJECT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(KdeError::InvalidInput(
            "Project name may only contain letters, digits, '.', '-' and '_'".to_string(),
        ))
    }
}

/// Parse a TCP port in 1..=65535
pub fn parse_port(input: &str) -> Result<u16, KdeError> {
    match input.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(KdeError::InvalidInput(format!(
            "'{}' is not a valid port (1-65535)",
            input.trim()
        ))),
    }
}

/// Parse the number of log lines to tail
pub fn parse_line_count(input: &str) -> Result<u32, KdeError> {
    match input.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(KdeError::InvalidInput(format!(
            "'{}' is not a positive line count",
            input.trim()
        ))),
    }
}
