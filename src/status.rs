use std::fmt;

use serde::{Deserialize, Serialize};

/// Execution state of a task or step as reported by the run-status payload.
///
/// Matching is case-sensitive. Anything outside the known vocabulary is kept
/// verbatim in [`Status::Other`] so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Running,
    Success,
    NotExecuted,
    Error,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Running => "Running",
            Status::Success => "Success",
            Status::NotExecuted => "NotExecuted",
            Status::Error => "Error",
            Status::Other(raw) => raw,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Status::Running => Color::RUNNING,
            Status::Success => Color::SUCCESS,
            Status::NotExecuted => Color::NOT_EXECUTED,
            Status::Error => Color::ERROR,
            Status::Other(_) => Color::NEUTRAL,
        }
    }
}

impl From<&str> for Status {
    fn from(raw: &str) -> Self {
        match raw {
            "Running" => Status::Running,
            "Success" => Status::Success,
            "NotExecuted" => Status::NotExecuted,
            "Error" => Status::Error,
            other => Status::Other(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match Status::from(raw.as_str()) {
            Status::Other(_) => Status::Other(raw),
            known => known,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque RGB color, displayed as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RUNNING: Color = Color::rgb(0x5B, 0x8F, 0xF9);
    pub const SUCCESS: Color = Color::rgb(0x30, 0xBF, 0x78);
    pub const NOT_EXECUTED: Color = Color::rgb(0xF6, 0xBD, 0x16);
    pub const ERROR: Color = Color::rgb(0xE8, 0x68, 0x4A);
    pub const NEUTRAL: Color = Color::rgb(0x5D, 0x70, 0x92);

    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps a raw status string to its display color.
///
/// Every view that shows a status goes through this function (or
/// [`Status::color`], which it delegates to), so the same state always has
/// the same color.
pub fn status_color(status: &str) -> Color {
    Status::from(status).color()
}

/// Color for an optional status; absent means "not executed yet / unknown".
pub fn optional_status_color(status: Option<&Status>) -> Color {
    status.map_or(Color::NEUTRAL, Status::color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_have_distinct_colors() {
        let colors = [
            status_color("Running"),
            status_color("Success"),
            status_color("NotExecuted"),
            status_color("Error"),
            status_color(""),
        ];

        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        assert_eq!(status_color("Running"), status_color("Running"));
        assert_eq!(status_color("Running").to_string(), "#5B8FF9");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(status_color("running"), Color::NEUTRAL);
        assert_eq!(status_color("SUCCESS"), Color::NEUTRAL);
        assert_eq!(Status::from("error"), Status::Other("error".to_string()));
    }

    #[test]
    fn absent_status_is_neutral() {
        assert_eq!(optional_status_color(None), Color::NEUTRAL);
        assert_eq!(
            optional_status_color(Some(&Status::Error)),
            Color::rgb(0xE8, 0x68, 0x4A)
        );
    }

    #[test]
    fn unknown_status_keeps_raw_value() {
        let status: Status = serde_json::from_str("\"Paused\"").unwrap();
        assert_eq!(status, Status::Other("Paused".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Paused\"");
        assert_eq!(serde_json::to_string(&Status::NotExecuted).unwrap(), "\"NotExecuted\"");
    }
}
