//! The fixed catalog of question themes
//!
//! A game is won by collecting a wedge in every theme, so the catalog is
//! closed: six themes, always in the same canonical order.

use std::{fmt::Display, str::FromStr};

use enum_map::Enum;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// One of the six canonical question categories
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, DeserializeFromStr, SerializeDisplay,
)]
pub enum Theme {
    /// The five books of Moses
    Torah,
    /// The prophetic books
    Prophets,
    /// Gospels, Acts and the epistles
    NewTestament,
    /// The spread of the early church
    Propagation,
    /// Biblical figures
    Characters,
    /// General biblical culture
    Culture,
}

/// Error returned when parsing a label that names no theme
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

impl Theme {
    /// Every theme, in canonical order
    pub const ALL: [Theme; 6] = [
        Theme::Torah,
        Theme::Prophets,
        Theme::NewTestament,
        Theme::Propagation,
        Theme::Characters,
        Theme::Culture,
    ];

    /// Number of themes a team must collect to win
    pub const COUNT: usize = Self::ALL.len();

    /// The label shown to players and used in serialized data
    pub fn label(self) -> &'static str {
        match self {
            Theme::Torah => "Torah",
            Theme::Prophets => "Prophètes",
            Theme::NewTestament => "Nouveau Testament",
            Theme::Propagation => "Propagation",
            Theme::Characters => "Personnages",
            Theme::Culture => "Culture",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.label() == s)
            .ok_or_else(|| UnknownTheme(s.to_owned()))
    }
}
