//! Weather code classification.
//!
//! Maps Open-Meteo WMO weather codes to a short label and a coarse icon key.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Icon key reported for codes missing from the table
pub const UNKNOWN_ICON: &str = "unknown";

/// Label and icon for one weather code
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    pub text: Option<String>,
    pub icon: Option<String>,
}

impl Condition {
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        (self.text, self.icon)
    }
}

/// Look up a code in the static table
pub fn lookup(code: i64) -> Option<(&'static str, &'static str)> {
    let entry = match code {
        0 => ("Clear sky", "clear"),
        1 => ("Mainly clear", "clear"),
        2 => ("Partly cloudy", "partly_cloudy"),
        3 => ("Overcast", "cloudy"),
        45 => ("Fog", "fog"),
        48 => ("Depositing rime fog", "fog"),
        51 => ("Light drizzle", "drizzle"),
        61 => ("Slight rain", "rain"),
        63 => ("Moderate rain", "rain"),
        65 => ("Heavy rain", "rain"),
        71 => ("Slight snow", "snow"),
        80 => ("Rain showers", "showers"),
        95 => ("Thunderstorm", "thunder"),
        _ => return None,
    };
    Some(entry)
}

/// Classify an optional weather code.
///
/// Absent codes yield an empty condition; codes outside the table yield
/// `"Code <n>"` with the [`UNKNOWN_ICON`] key.
pub fn classify(code: Option<i64>) -> Condition {
    let Some(code) = code else {
        return Condition::default();
    };

    match lookup(code) {
        Some((text, icon)) => Condition {
            text: Some(text.to_string()),
            icon: Some(icon.to_string()),
        },
        None => Condition {
            text: Some(format!("Code {}", code)),
            icon: Some(UNKNOWN_ICON.to_string()),
        },
    }
}
