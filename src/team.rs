//! Teams and team name validation
//!
//! A team is a passive record: a display name fixed at setup and the set
//! of themes it has collected a wedge for. Only the game engine adds
//! themes to it.

use std::collections::BTreeSet;

use rustrict::CensorStr;
use thiserror::Error;

use crate::{constants, theme::Theme};

/// Errors that can occur during team name validation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
}

/// Validates and cleans a requested team name
///
/// # Errors
///
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::TooLong` - Name exceeds `MAX_NAME_LENGTH` characters
/// * `Error::Sinful` - Name contains inappropriate content
pub fn clean_name(name: &str) -> Result<String, Error> {
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.chars().count() > constants::team::MAX_NAME_LENGTH {
        return Err(Error::TooLong);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_owned())
}

/// A team taking part in a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Display name, immutable after creation
    name: String,
    /// Themes this team has collected a wedge for
    won_themes: BTreeSet<Theme>,
}

impl Team {
    /// Creates a team with no themes won
    ///
    /// # Errors
    ///
    /// Returns an error if the name fails [`clean_name`].
    pub fn new(name: &str) -> Result<Self, Error> {
        Ok(Self {
            name: clean_name(name)?,
            won_themes: BTreeSet::new(),
        })
    }

    /// The team's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Themes this team has collected, in canonical order
    pub fn won_themes(&self) -> &BTreeSet<Theme> {
        &self.won_themes
    }

    /// Whether this team already holds the wedge for `theme`
    pub fn has_theme(&self, theme: Theme) -> bool {
        self.won_themes.contains(&theme)
    }

    /// Number of wedges collected
    pub fn wedge_count(&self) -> usize {
        self.won_themes.len()
    }

    /// Records a won theme, returning whether it was new
    pub(crate) fn insert_theme(&mut self, theme: Theme) -> bool {
        self.won_themes.insert(theme)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_team_new() {
        let team = Team::new("Les Lévites").unwrap();

        assert_eq!(team.name(), "Les Lévites");
        assert!(team.won_themes().is_empty());
        assert_eq!(team.wedge_count(), 0);
    }

    #[test]
    fn test_team_name_trimmed() {
        let team = Team::new("  Bergers \t").unwrap();
        assert_eq!(team.name(), "Bergers");
    }

    #[test]
    fn test_team_empty_name() {
        assert_eq!(Team::new(""), Err(Error::Empty));
        assert_eq!(Team::new("   "), Err(Error::Empty));
        assert_eq!(Team::new("\t\n"), Err(Error::Empty));
    }

    #[test]
    fn test_team_name_length() {
        let max_name = "é".repeat(constants::team::MAX_NAME_LENGTH);
        assert!(Team::new(&max_name).is_ok());

        let long_name = "a".repeat(constants::team::MAX_NAME_LENGTH + 1);
        assert_eq!(Team::new(&long_name), Err(Error::TooLong));
    }

    #[test]
    fn test_team_inappropriate_name() {
        for name in ["fuck", "shit"] {
            assert_eq!(
                Team::new(name),
                Err(Error::Sinful),
                "Expected '{name}' to be flagged as inappropriate"
            );
        }
    }

    #[test]
    fn test_team_insert_theme_is_idempotent() {
        let mut team = Team::new("A").unwrap();

        assert!(team.insert_theme(Theme::Culture));
        assert!(!team.insert_theme(Theme::Culture));
        assert_eq!(team.wedge_count(), 1);
        assert!(team.has_theme(Theme::Culture));
        assert!(!team.has_theme(Theme::Torah));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Empty.to_string(), "name cannot be empty");
        assert_eq!(Error::TooLong.to_string(), "name is too long");
        assert_eq!(Error::Sinful.to_string(), "name is inappropriate");
    }
}
