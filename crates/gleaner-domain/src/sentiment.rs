//! Sentiment module - overall emotional tone of a text

use std::fmt;

/// Overall tone of an analyzed text
///
/// `Unknown` is reserved for analyses where the model could not be
/// consulted; a model that simply omits the field yields `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sentiment {
    /// Favorable tone
    Positive,

    /// Neither favorable nor unfavorable
    #[default]
    Neutral,

    /// Unfavorable tone
    Negative,

    /// No model verdict available
    Unknown,
}

impl Sentiment {
    /// Get the sentiment label as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Unknown => "unknown",
        }
    }

    /// Parse a sentiment label, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            "unknown" => Some(Sentiment::Unknown),
            _ => None,
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid sentiment: {}", s))
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Sentiment::parse("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse(" NEGATIVE "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::parse("neutral"), Some(Sentiment::Neutral));
    }

    #[test]
    fn test_parse_rejects_other_labels() {
        assert_eq!(Sentiment::parse("mixed"), None);
        assert!("".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_default_is_neutral() {
        assert_eq!(Sentiment::default(), Sentiment::Neutral);
    }

    #[test]
    fn test_as_str_roundtrip() {
        for s in [
            Sentiment::Positive,
            Sentiment::Neutral,
            Sentiment::Negative,
            Sentiment::Unknown,
        ] {
            assert_eq!(Sentiment::parse(s.as_str()), Some(s));
        }
    }
}
