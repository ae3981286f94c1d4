//! Recording filenames
//!
//! `"{label}_{timestamp}.wav"` where the timestamp is the wall-clock time
//! the take stopped, formatted `YYYY-MM-DD_TIMEHH-MM-SS`.

use chrono::NaiveDateTime;

/// Label used when the user leaves the field blank
pub const DEFAULT_LABEL: &str = "Unnamed";

/// chrono format for the timestamp part of a filename
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_TIME%H-%M-%S";

/// Characters that are not allowed in a label
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Format `at` as `YYYY-MM-DD_TIMEHH-MM-SS`
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Trim a user label and make it safe to use as part of a filename
///
/// Blank labels become `default_label`.
pub fn sanitize_label(label: &str, default_label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() {
        default_label.to_string()
    } else {
        cleaned
    }
}

/// Builds filenames for finished takes
#[derive(Debug, Clone)]
pub struct FilenameTemplate {
    labeled: bool,
    default_label: String,
}

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self::new(true, DEFAULT_LABEL)
    }
}

impl FilenameTemplate {
    /// Create a template
    ///
    /// A blank `default_label` falls back to [`DEFAULT_LABEL`].
    pub fn new(labeled: bool, default_label: &str) -> Self {
        Self {
            labeled,
            default_label: sanitize_label(default_label, DEFAULT_LABEL),
        }
    }

    /// Whether the label is part of the filename
    pub fn is_labeled(&self) -> bool {
        self.labeled
    }

    /// Filename for a take labelled `label` that stopped at `at`
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use wavrec::session::FilenameTemplate;
    ///
    /// let at = NaiveDate::from_ymd_opt(2024, 3, 5)
    ///     .unwrap()
    ///     .and_hms_opt(9, 7, 3)
    ///     .unwrap();
    /// let name = FilenameTemplate::default().render("  ", &at);
    /// assert_eq!(name, "Unnamed_2024-03-05_TIME09-07-03.wav");
    /// ```
    pub fn render(&self, label: &str, at: &NaiveDateTime) -> String {
        let timestamp = format_timestamp(at);
        if self.labeled {
            format!(
                "{}_{}.wav",
                sanitize_label(label, &self.default_label),
                timestamp
            )
        } else {
            format!("{}.wav", timestamp)
        }
    }
}
