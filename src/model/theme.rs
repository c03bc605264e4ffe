use serde::{Deserialize, Serialize};

/// The display palette. It is a process-wide preference that survives logout.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Emerald Green
    #[default]
    Emerald,
    /// Royal Blue
    Royal,
    /// Slate Gold
    Gold,
    /// Midnight Rose
    Midnight,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

impl Theme {
    /// The human-readable name of the palette.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Emerald => "Emerald Green",
            Theme::Royal => "Royal Blue",
            Theme::Gold => "Slate Gold",
            Theme::Midnight => "Midnight Rose",
        }
    }
}

#[test]
fn test_theme_names() {
    use std::str::FromStr;
    assert_eq!(Theme::default(), Theme::Emerald);
    assert_eq!(Theme::Midnight.to_string(), "midnight");
    assert_eq!(Theme::from_str("royal").unwrap(), Theme::Royal);
    assert_eq!(serde_json::to_string(&Theme::Gold).unwrap(), "\"gold\"");
    assert!(serde_json::from_str::<Theme>("\"neon\"").is_err());
}
