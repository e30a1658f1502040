//! Serializable game snapshots
//!
//! The host application saves a snapshot after every mutating call and
//! restores it when the game screen is reloaded. This module only defines
//! the shape; where the JSON is stored is the host's business.
//!
//! Every field is optional on input so that snapshots written by older or
//! partial saves still load: missing (or `null`) fields take their empty
//! value and [`crate::game::Game::restore`] repairs what is left.

use std::collections::BTreeSet;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};
use thiserror::Error;

use crate::{question::Question, team::Team, theme::Theme};

/// Errors that can occur while reading a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The snapshot is not valid JSON or has fields of the wrong type
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// The persisted form of a team
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamRecord {
    /// Display name
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    /// Themes the team has collected a wedge for
    #[serde_as(as = "DefaultOnNull")]
    pub won_themes: BTreeSet<Theme>,
}

impl From<&Team> for TeamRecord {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name().to_owned(),
            won_themes: team.won_themes().clone(),
        }
    }
}

/// Everything needed to rebuild a game, except the question bank
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Teams in turn order
    #[serde_as(as = "DefaultOnNull")]
    pub teams: Vec<TeamRecord>,
    /// Index of the active team
    #[serde_as(as = "DefaultOnNull")]
    pub current_team_index: usize,
    /// Questions already shown this game, oldest first
    #[serde_as(as = "DefaultOnNull")]
    pub asked_questions: Vec<Question>,
}

impl Snapshot {
    /// Converts the snapshot to a JSON string for storage
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }

    /// Parses a snapshot from JSON, defaulting absent fields
    ///
    /// Each top-level field that is missing or `null` is logged before it
    /// takes its default.
    ///
    /// # Errors
    ///
    /// Returns `Error::Malformed` if the input is not JSON or a present
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::Malformed(e.to_string()))?;

        if let Some(fields) = value.as_object() {
            for field in ["teams", "currentTeamIndex", "askedQuestions"] {
                if fields.get(field).is_none_or(serde_json::Value::is_null) {
                    warn!(
                        target: "camembert::snapshot",
                        "snapshot has no {field}, using the default"
                    );
                }
            }
        }

        serde_json::from_value(value).map_err(|e| Error::Malformed(e.to_string()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_field_names() {
        let snapshot = Snapshot {
            teams: vec![TeamRecord {
                name: "A".to_string(),
                won_themes: BTreeSet::from([Theme::Propagation]),
            }],
            current_team_index: 0,
            asked_questions: vec![Question::new(
                Theme::Torah,
                "Q",
                vec!["A".to_string(), "B".to_string()],
                1,
            )],
        };

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json()).unwrap();
        assert_eq!(value["currentTeamIndex"], 0);
        assert_eq!(value["teams"][0]["wonThemes"][0], "Propagation");
        assert_eq!(value["askedQuestions"][0]["correctIndex"], 1);
    }

    #[test]
    fn test_team_record_from_team() {
        let mut team = Team::new(" A ").unwrap();
        team.insert_theme(Theme::Culture);
        team.insert_theme(Theme::Torah);

        let value = serde_json::to_value(TeamRecord::from(&team)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "A", "wonThemes": ["Torah", "Culture"]})
        );
    }

    #[test]
    fn test_snapshot_from_json_preserves_data() {
        let json = r#"{
            "teams": [
                {"name": "A", "wonThemes": ["Torah", "Culture"]},
                {"name": "B", "wonThemes": []}
            ],
            "currentTeamIndex": 1,
            "askedQuestions": [
                {"theme": "Torah", "question": "Q", "options": ["A", "B"], "correctIndex": 0}
            ]
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();

        assert_eq!(snapshot.teams.len(), 2);
        assert_eq!(
            snapshot.teams[0].won_themes,
            BTreeSet::from([Theme::Torah, Theme::Culture])
        );
        assert_eq!(snapshot.current_team_index, 1);
        assert_eq!(snapshot.asked_questions[0].prompt(), "Q");
    }

    #[test]
    fn test_snapshot_missing_fields_default() {
        let snapshot = Snapshot::from_json(r#"{"teams": [{"name": "A"}, {"name": "B"}]}"#).unwrap();

        assert_eq!(snapshot.current_team_index, 0);
        assert!(snapshot.asked_questions.is_empty());
        assert!(snapshot.teams.iter().all(|t| t.won_themes.is_empty()));

        assert_eq!(Snapshot::from_json("{}").unwrap(), Snapshot::default());
    }

    #[test]
    fn test_snapshot_null_fields_default() {
        let json = r#"{
            "teams": [{"name": "A", "wonThemes": null}],
            "currentTeamIndex": null,
            "askedQuestions": null
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();

        assert_eq!(snapshot.current_team_index, 0);
        assert!(snapshot.asked_questions.is_empty());
        assert!(snapshot.teams[0].won_themes.is_empty());
    }

    #[test]
    fn test_snapshot_duplicate_won_themes_collapse() {
        let snapshot =
            Snapshot::from_json(r#"{"teams": [{"name": "A", "wonThemes": ["Torah", "Torah"]}]}"#)
                .unwrap();
        assert_eq!(snapshot.teams[0].won_themes.len(), 1);
    }

    #[test]
    fn test_snapshot_malformed() {
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            Snapshot::from_json("5"),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            Snapshot::from_json(r#"{"currentTeamIndex": "one"}"#),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            Snapshot::from_json(r#"{"teams": [{"name": "A", "wonThemes": ["Astronomie"]}]}"#),
            Err(Error::Malformed(_))
        ));
    }
}
