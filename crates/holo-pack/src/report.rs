//! Pre-filled issue reports for crashed generations

use crate::settings::ReportSettings;
use std::fmt;

/// Prefix of every report title
pub const TITLE_PREFIX: &str = "Pack creation error: ";

/// A link that opens a new issue with the crash details filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReport {
    pub title: String,
    pub version: String,
    pub url: String,
}

impl IssueReport {
    /// Build a report for `error_message`. Newlines in the message are
    /// flattened to spaces; title, version and logs are percent-encoded.
    pub fn new(settings: &ReportSettings, error_message: &str, version: &str, logs_json: &str) -> Self {
        let title = format!("{}{}", TITLE_PREFIX, error_message.replace('\n', " "));
        let url = format!(
            "{}?template={}&title={}&version={}&logs={}",
            settings.issue_url,
            urlencoding::encode(&settings.template),
            urlencoding::encode(&title),
            urlencoding::encode(version),
            urlencoding::encode(logs_json),
        );
        Self {
            title,
            version: version.to_string(),
            url,
        }
    }
}

impl fmt::Display for IssueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_url_encodes_dynamic_segments() {
        let report = IssueReport::new(
            &ReportSettings::default(),
            "Texture atlas overflow\nat stitch()",
            "v1.0.0",
            r#"[{"message":"a&b"}]"#,
        );
        assert_eq!(report.title, "Pack creation error: Texture atlas overflow at stitch()");
        assert!(report
            .url
            .starts_with("https://github.com/Holo-Lab/holo/issues/new?template=1-pack-creation-error.yml&title="));
        assert!(report.url.contains("Texture%20atlas%20overflow%20at%20stitch%28%29"));
        assert!(report.url.contains("&version=v1.0.0&"));
        assert!(report.url.ends_with("&logs=%5B%7B%22message%22%3A%22a%26b%22%7D%5D"));
        assert!(!report.url.contains('\n'));
    }
}
