use serde::{Deserialize, Serialize};
use std::fmt;

/// Triage bucket stored on a task.
///
/// Persisted as an optional string. Strings other than the three known
/// buckets are kept verbatim so a round trip never loses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Zone {
    #[default]
    Unset,
    Critical,
    Focus,
    Inbox,
    Unrecognized(String),
}

impl Zone {
    pub fn is_unset(&self) -> bool {
        matches!(self, Zone::Unset)
    }

    /// One of critical, focus or inbox.
    pub fn is_recognized(&self) -> bool {
        matches!(self, Zone::Critical | Zone::Focus | Zone::Inbox)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Zone::Unset => None,
            Zone::Critical => Some("critical"),
            Zone::Focus => Some("focus"),
            Zone::Inbox => Some("inbox"),
            Zone::Unrecognized(s) => Some(s),
        }
    }
}

impl From<Option<String>> for Zone {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            None | Some("") => Zone::Unset,
            Some("critical") => Zone::Critical,
            Some("focus") => Zone::Focus,
            Some("inbox") => Zone::Inbox,
            Some(_) => Zone::Unrecognized(raw.unwrap_or_default()),
        }
    }
}

impl From<Zone> for Option<String> {
    fn from(zone: Zone) -> Self {
        match zone {
            Zone::Unset => None,
            Zone::Unrecognized(s) => Some(s),
            other => other.as_str().map(str::to_string),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("unset"))
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Zone::from(Some(s.trim().to_ascii_lowercase())) {
            Zone::Unrecognized(other) => {
                Err(format!("unknown zone '{other}' (expected critical, focus or inbox)"))
            }
            zone => Ok(zone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strings_survive_a_round_trip() {
        let zone: Zone = serde_json::from_str("\"someday\"").unwrap();
        assert_eq!(zone, Zone::Unrecognized("someday".into()));
        assert!(!zone.is_recognized());
        assert_eq!(serde_json::to_string(&zone).unwrap(), "\"someday\"");
    }

    #[test]
    fn null_and_empty_read_as_unset() {
        assert_eq!(serde_json::from_str::<Zone>("null").unwrap(), Zone::Unset);
        assert_eq!(serde_json::from_str::<Zone>("\"\"").unwrap(), Zone::Unset);
    }

    #[test]
    fn parses_user_input() {
        assert_eq!("Critical".parse::<Zone>().unwrap(), Zone::Critical);
        assert!("later".parse::<Zone>().is_err());
    }
}
