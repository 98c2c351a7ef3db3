use std::collections::HashMap;

use kdepanel_types::{EnvStatus, StatusRecord};

use crate::KdeError;

/// Split line-oriented CLI output into names, dropping blank lines
pub fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `kde status json` into environment name -> status.
///
/// Blank output is not valid JSON and fails like any other malformed output.
pub fn parse_status(output: &str) -> Result<HashMap<String, EnvStatus>, KdeError> {
    let records: Vec<StatusRecord> = serde_json::from_str(output.trim())?;
    Ok(records
        .into_iter()
        .map(|r| (r.environment, EnvStatus::from(r.status.as_str())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_and_skip_blanks() {
        let names = parse_lines("dev\n\nstaging\r\n  \nprod\r\n");
        assert_eq!(names, vec!["dev", "staging", "prod"]);
    }

    #[test]
    fn test_lines_empty_output() {
        assert!(parse_lines("").is_empty());
        assert!(parse_lines("\n\r\n").is_empty());
    }

    #[test]
    fn test_status_maps_environment_to_status() {
        let json = r#"[
            {"environment": "dev", "status": "RUNNING"},
            {"environment": "staging", "status": "UNREADY"},
            {"environment": "broken", "status": "error"}
        ]"#;
        let status = parse_status(json).unwrap();

        assert_eq!(status.len(), 3);
        assert_eq!(status["dev"], EnvStatus::Running);
        assert_eq!(status["staging"], EnvStatus::Unready);
        assert_eq!(status["broken"], EnvStatus::Error);
    }

    #[test]
    fn test_status_later_record_wins() {
        let json = r#"[{"environment":"dev","status":"UNREADY"},{"environment":"dev","status":"RUNNING"}]"#;
        assert_eq!(parse_status(json).unwrap()["dev"], EnvStatus::Running);
    }

    #[test]
    fn test_status_empty_and_malformed() {
        assert!(matches!(parse_status(""), Err(KdeError::InvalidStatus(_))));
        assert!(matches!(parse_status("  \n"), Err(KdeError::InvalidStatus(_))));
        assert!(parse_status("[]").unwrap().is_empty());
        assert!(matches!(
            parse_status("not json"),
            Err(KdeError::InvalidStatus(_))
        ));
        assert!(parse_status(r#"[{"environment":"dev"}]"#).is_err());
    }
}
