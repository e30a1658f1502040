//! Core game state and question selection
//!
//! This module contains the game engine: the ordered teams, whose turn it
//! is, which questions have already been shown, and the rules for picking
//! the next question and recording wedges. Everything a screen needs to
//! drive a game goes through [`Game`].

use std::{collections::HashSet, fmt::Debug};

use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    constants,
    question::{Question, QuestionBank},
    random::{self, RandomSource},
    snapshot::{Snapshot, TeamRecord},
    team::{self, Team},
    theme::Theme,
};

/// Errors that can occur when creating or restoring a game
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The number of teams is outside the allowed range
    #[error(
        "a game needs between {min} and {max} teams, got {0}",
        min = constants::team::MIN_COUNT,
        max = constants::team::MAX_COUNT
    )]
    TeamCount(usize),
    /// A team name failed validation
    #[error("invalid team name: {0}")]
    TeamName(#[from] team::Error),
    /// Two teams share the same name
    #[error("more than one team is named {0}")]
    DuplicateTeamName(String),
}

/// Questions already shown in the current game
///
/// Keeps the shown records in order for snapshots, plus an index of their
/// prompts for the duplicate checks every selection performs.
#[derive(Debug, Clone, Default)]
struct AskedQuestions {
    questions: Vec<Question>,
    prompts: HashSet<String>,
}

impl AskedQuestions {
    fn contains(&self, prompt: &str) -> bool {
        self.prompts.contains(prompt)
    }

    /// Records a question, returning whether it was not already recorded
    fn record(&mut self, question: &Question) -> bool {
        if self.prompts.insert(question.prompt().to_owned()) {
            self.questions.push(question.clone());
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.questions.clear();
        self.prompts.clear();
    }
}

impl From<Vec<Question>> for AskedQuestions {
    /// Rebuilds the history from a serialized list, keeping the first
    /// occurrence of any repeated prompt
    fn from(questions: Vec<Question>) -> Self {
        let mut asked = Self::default();
        for question in &questions {
            asked.record(question);
        }
        asked
    }
}

/// The game engine for one session
///
/// Borrows the question bank for its whole lifetime and owns everything
/// else: the teams in turn order, the turn pointer, the asked history and
/// the random source used for every draw.
pub struct Game<'bank, R: RandomSource = fastrand::Rng> {
    /// The read-only bank questions are drawn from
    bank: &'bank QuestionBank,
    /// Teams in turn order, between two and three of them
    teams: Vec<Team>,
    /// Index of the active team in `teams`
    current_team_index: usize,
    /// Questions shown since the last reset
    asked: AskedQuestions,
    /// Source for every random draw
    rng: R,
}

impl<R: RandomSource> Debug for Game<'_, R> {
    /// Custom debug implementation that leaves out the question bank
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("teams", &self.teams)
            .field("current_team_index", &self.current_team_index)
            .field("asked", &self.asked.questions.len())
            .finish_non_exhaustive()
    }
}

/// Checks the team count and name uniqueness shared by both constructors
fn check_teams(teams: Vec<Team>) -> Result<Vec<Team>, Error> {
    if !(constants::team::MIN_COUNT..=constants::team::MAX_COUNT).contains(&teams.len()) {
        return Err(Error::TeamCount(teams.len()));
    }
    if let Some(name) = teams.iter().map(Team::name).duplicates().next() {
        return Err(Error::DuplicateTeamName(name.to_owned()));
    }
    Ok(teams)
}

impl<'bank, R: RandomSource> Game<'bank, R> {
    /// Creates a new game with the first team to play
    ///
    /// # Arguments
    ///
    /// * `bank` - The question bank to draw from
    /// * `team_names` - Team names in turn order
    /// * `rng` - The random source used for question selection
    ///
    /// # Errors
    ///
    /// * `Error::TeamName` - A name is blank, too long or inappropriate
    /// * `Error::TeamCount` - Fewer than two or more than three teams
    /// * `Error::DuplicateTeamName` - Two names are equal after trimming
    pub fn new<I>(bank: &'bank QuestionBank, team_names: I, rng: R) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let teams = team_names
            .into_iter()
            .map(|name| Team::new(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let teams = check_teams(teams)?;

        debug!(
            target: "camembert::game",
            "new game for {}",
            teams.iter().map(Team::name).join(", ")
        );

        Ok(Self {
            bank,
            teams,
            current_team_index: 0,
            asked: AskedQuestions::default(),
            rng,
        })
    }

    /// Rebuilds a game from a snapshot, repairing what can be repaired
    ///
    /// The teams must still be valid. An out-of-range team index falls
    /// back to the first team and repeated entries in the asked history
    /// are dropped.
    ///
    /// # Errors
    ///
    /// The same team errors as [`Self::new`].
    pub fn restore(bank: &'bank QuestionBank, snapshot: Snapshot, rng: R) -> Result<Self, Error> {
        let Snapshot {
            teams,
            current_team_index,
            asked_questions,
        } = snapshot;

        let teams = teams
            .into_iter()
            .map(|record| -> Result<Team, Error> {
                let mut team = Team::new(&record.name)?;
                for theme in record.won_themes {
                    team.insert_theme(theme);
                }
                Ok(team)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let teams = check_teams(teams)?;

        let current_team_index = if current_team_index < teams.len() {
            current_team_index
        } else {
            warn!(
                target: "camembert::game",
                "snapshot team index {current_team_index} out of range, starting from the first team"
            );
            0
        };

        let stored = asked_questions.len();
        let asked = AskedQuestions::from(asked_questions);
        if asked.questions.len() < stored {
            warn!(
                target: "camembert::game",
                "dropped {} repeated questions from the snapshot history",
                stored - asked.questions.len()
            );
        }

        Ok(Self {
            bank,
            teams,
            current_team_index,
            asked,
            rng,
        })
    }

    /// Captures the state needed to rebuild this game
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            teams: self.teams.iter().map(TeamRecord::from).collect(),
            current_team_index: self.current_team_index,
            asked_questions: self.asked.questions.clone(),
        }
    }

    /// The question bank this game draws from
    pub fn bank(&self) -> &'bank QuestionBank {
        self.bank
    }

    /// All teams in turn order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Index of the active team
    pub fn current_team_index(&self) -> usize {
        self.current_team_index
    }

    /// Questions shown since the last history reset, oldest first
    pub fn asked_questions(&self) -> &[Question] {
        &self.asked.questions
    }

    /// The team whose turn it is
    pub fn current_team(&self) -> &Team {
        &self.teams[self.current_team_index]
    }

    /// Passes the turn to the next team, wrapping after the last one
    pub fn next_team(&mut self) {
        self.current_team_index = (self.current_team_index + 1) % self.teams.len();
        debug!(
            target: "camembert::game",
            "turn passes to {}",
            self.current_team().name()
        );
    }

    /// Whether the active team can still win a wedge in `theme`
    pub fn is_theme_available(&self, theme: Theme) -> bool {
        !self.current_team().has_theme(theme)
    }

    /// Gives the active team the wedge for `theme`
    ///
    /// Does nothing if the team already holds it. Returns whether the
    /// wedge was newly added.
    pub fn add_theme_to_current_team(&mut self, theme: Theme) -> bool {
        if !self.is_theme_available(theme) {
            return false;
        }
        let team = &mut self.teams[self.current_team_index];
        let added = team.insert_theme(theme);
        if added {
            info!(
                target: "camembert::game",
                "{} wins the {theme} wedge ({}/{})",
                team.name(),
                team.wedge_count(),
                Theme::COUNT
            );
        }
        added
    }

    /// Whether the active team holds a wedge for every theme
    pub fn current_team_has_won(&self) -> bool {
        self.current_team().wedge_count() == Theme::COUNT
    }

    /// The active team, if it has won
    pub fn winner(&self) -> Option<&Team> {
        self.current_team_has_won().then(|| self.current_team())
    }

    /// Draws up to `count` questions that have not been shown yet
    ///
    /// The picks are uniformly random and recorded as asked. If every
    /// question of the bank has already been shown, the history is
    /// cleared instead and the first `count` questions of the bank are
    /// returned in bank order, without being recorded.
    pub fn get_random_questions(&mut self, count: usize) -> Vec<&'bank Question> {
        let bank = self.bank;
        let remaining = bank
            .iter()
            .filter(|question| !self.asked.contains(question.prompt()))
            .collect_vec();

        if remaining.is_empty() {
            warn!(
                target: "camembert::game",
                "all {} questions have been asked, resetting history",
                bank.len()
            );
            self.asked.clear();
            return bank.iter().take(count).collect();
        }

        let selected = random::sample(&mut self.rng, remaining, count);
        for question in &selected {
            self.asked.record(question);
        }
        debug!(
            target: "camembert::game",
            "drew {} questions, {} asked so far",
            selected.len(),
            self.asked.questions.len()
        );
        selected
    }

    /// Draws an unseen question of `theme`, or `None` if none is left
    pub fn get_question_for_theme(&mut self, theme: Theme) -> Option<&'bank Question> {
        let bank = self.bank;
        let candidates = bank
            .for_theme(theme)
            .filter(|question| !self.asked.contains(question.prompt()))
            .collect_vec();
        self.pick(&candidates)
    }

    /// Draws an unseen question from any theme the active team has not won
    ///
    /// This is the wedge selector: it never returns a question from a
    /// theme the active team already holds.
    pub fn get_random_question_for_available_themes(&mut self) -> Option<&'bank Question> {
        let available = Theme::ALL
            .into_iter()
            .filter(|theme| self.is_theme_available(*theme))
            .collect_vec();
        if available.is_empty() {
            return None;
        }

        let bank = self.bank;
        let candidates = bank
            .iter()
            .filter(|question| {
                available.contains(&question.theme()) && !self.asked.contains(question.prompt())
            })
            .collect_vec();
        self.pick(&candidates)
    }

    /// Picks one candidate uniformly at random and records it as asked
    fn pick(&mut self, candidates: &[&'bank Question]) -> Option<&'bank Question> {
        let question = *random::choose(&mut self.rng, candidates)?;
        self.asked.record(question);
        debug!(
            target: "camembert::game",
            "drew a {} question out of {} candidates",
            question.theme(),
            candidates.len()
        );
        Some(question)
    }
}
