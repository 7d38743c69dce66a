//! Version comparison between the tool and a template's expectation

use semver::Version;

/// Compare the running tool version against what a template declares
/// Returns a warning message when the tool is older than the template expects
pub fn check_compatibility(tool_version: &str, template_version: &str) -> Option<String> {
    let tool = Version::parse(strip_v(tool_version)).ok()?;
    let template = Version::parse(strip_v(template_version)).ok()?;

    if tool < template {
        Some(format!(
            "This template was designed for stamp {} or newer; you are running {}.",
            template_version, tool_version
        ))
    } else {
        None
    }
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_older_than_template() {
        let warning = check_compatibility("0.1.0", "0.2.0");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_tool_same_as_template() {
        assert!(check_compatibility("0.1.0", "0.1.0").is_none());
    }

    #[test]
    fn test_tool_newer_than_template() {
        assert!(check_compatibility("0.2.0", "0.1.0").is_none());
    }

    #[test]
    fn test_invalid_versions_skip_warning() {
        assert!(check_compatibility("invalid", "0.1.0").is_none());
        assert!(check_compatibility("0.1.0", "not_versioned").is_none());
    }

    #[test]
    fn test_leading_v_is_tolerated() {
        assert!(check_compatibility("v0.1.0", "v0.2.0").is_some());
    }
}
