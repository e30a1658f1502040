//! Turn flow for a game in progress
//!
//! A [`Session`] drives one game through the per-team turn cycle: a team
//! answers questions until it misses one, a streak of correct answers
//! earns a wedge question, and a won wedge either ends the game or passes
//! the turn. The session only uses the public operations of [`Game`].

use std::fmt::Display;

use garde::Validate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants,
    game::Game,
    question::Question,
    random::RandomSource,
    snapshot::Snapshot,
    theme::Theme,
};

/// Runtime options for the turn flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Consecutive correct answers that earn a wedge question
    #[garde(range(
        min = constants::turn::MIN_STREAK_FOR_WEDGE,
        max = constants::turn::MAX_STREAK_FOR_WEDGE
    ))]
    wedge_streak: usize,
}

impl Default for Options {
    /// Three correct answers in a row earn a wedge question
    fn default() -> Self {
        Self {
            wedge_streak: constants::turn::STREAK_FOR_WEDGE,
        }
    }
}

impl Options {
    /// Creates options with a custom wedge streak
    pub fn new(wedge_streak: usize) -> Self {
        Self { wedge_streak }
    }

    /// Consecutive correct answers that earn a wedge question
    pub fn wedge_streak(&self) -> usize {
        self.wedge_streak
    }
}

/// Where the active team is in its turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<'bank> {
    /// A question is shown and the answer is hidden
    AwaitingAnswer {
        /// The question being asked
        question: &'bank Question,
        /// Whether answering it correctly wins a wedge
        wedge: bool,
    },
    /// The correct answer is shown and the host marks the team's answer
    AnswerRevealed {
        /// The question being asked
        question: &'bank Question,
        /// Whether answering it correctly wins a wedge
        wedge: bool,
    },
    /// The team earned a wedge attempt in `theme`
    WedgeOffered {
        /// Theme of the wedge on offer
        theme: Theme,
    },
    /// A team collected every wedge
    GameOver {
        /// Name of the winning team
        winner: String,
    },
}

impl Phase<'_> {
    fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingAnswer { .. } => "awaiting an answer",
            Phase::AnswerRevealed { .. } => "showing the answer",
            Phase::WedgeOffered { .. } => "offering a wedge",
            Phase::GameOver { .. } => "game over",
        }
    }
}

/// What happened after a turn action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The same team gets another question
    NextQuestion,
    /// The team earned a wedge attempt in this theme
    WedgeOffered(Theme),
    /// The turn passed to the named team
    TurnOver {
        /// Name of the team now playing
        next_team: String,
    },
    /// The named team won the game
    GameOver {
        /// Name of the winning team
        winner: String,
    },
}

/// Errors that can occur while driving a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The session options failed validation
    #[error("invalid options: {0}")]
    Options(String),
    /// The action does not fit the current phase
    #[error("cannot {action} while {phase}")]
    UnexpectedPhase {
        /// The attempted action
        action: &'static str,
        /// The phase the session was in
        phase: &'static str,
    },
}

/// One row of the scoreboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLine {
    /// Team name
    pub name: String,
    /// Current streak, always zero for teams not playing
    pub streak: usize,
    /// Streak needed for a wedge question
    pub wedge_streak: usize,
    /// Wedges collected
    pub wedges: usize,
    /// Whether this team is playing
    pub current: bool,
}

impl Display for ScoreLine {
    /// Renders as `A : 2/3, 1 camembert`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wedges = isize::try_from(self.wedges).unwrap_or(isize::MAX);
        write!(
            f,
            "{} : {}/{}, {}",
            self.name,
            self.streak,
            self.wedge_streak,
            pluralizer::pluralize("camembert", wedges, true)
        )
    }
}

/// A game being played, with the active team's streak and turn phase
///
/// The streak and phase are not part of the game snapshot: a session
/// rebuilt from a snapshot starts the stored team on a fresh question.
pub struct Session<'bank, R: RandomSource = fastrand::Rng> {
    game: Game<'bank, R>,
    options: Options,
    streak: usize,
    phase: Phase<'bank>,
}

impl<R: RandomSource> std::fmt::Debug for Session<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("game", &self.game)
            .field("streak", &self.streak)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<'bank, R: RandomSource> Session<'bank, R> {
    /// Starts the turn cycle on a new or restored game
    ///
    /// Draws the first question for the game's current team. A restored
    /// game whose current team already holds every wedge starts at game over.
    ///
    /// # Errors
    ///
    /// Returns `Error::Options` if the options fail validation.
    pub fn start(mut game: Game<'bank, R>, options: Options) -> Result<Self, Error> {
        options
            .validate()
            .map_err(|report| Error::Options(report.to_string()))?;

        if let Some(winner) = game.winner() {
            let winner = winner.name().to_owned();
            info!(target: "camembert::session", "{winner} has already won the game");
            return Ok(Self {
                game,
                options,
                streak: 0,
                phase: Phase::GameOver { winner },
            });
        }

        let question = draw_question(&mut game);
        debug!(
            target: "camembert::session",
            "session starts with {}",
            game.current_team().name()
        );

        Ok(Self {
            game,
            options,
            streak: 0,
            phase: Phase::AwaitingAnswer {
                question,
                wedge: false,
            },
        })
    }

    /// The underlying game
    pub fn game(&self) -> &Game<'bank, R> {
        &self.game
    }

    /// Releases the underlying game
    pub fn into_game(self) -> Game<'bank, R> {
        self.game
    }

    /// The options this session runs with
    pub fn options(&self) -> Options {
        self.options
    }

    /// The current phase of the turn
    pub fn phase(&self) -> &Phase<'bank> {
        &self.phase
    }

    /// Consecutive correct answers of the active team in this turn
    pub fn streak(&self) -> usize {
        self.streak
    }

    /// The question on screen, if any
    pub fn current_question(&self) -> Option<&'bank Question> {
        match self.phase {
            Phase::AwaitingAnswer { question, .. } | Phase::AnswerRevealed { question, .. } => {
                Some(question)
            }
            Phase::WedgeOffered { .. } | Phase::GameOver { .. } => None,
        }
    }

    /// Captures the game state for storage
    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    /// One line per team, in turn order
    pub fn scoreboard(&self) -> Vec<ScoreLine> {
        let current = self.game.current_team_index();
        self.game
            .teams()
            .iter()
            .enumerate()
            .map(|(index, team)| ScoreLine {
                name: team.name().to_owned(),
                streak: if index == current { self.streak } else { 0 },
                wedge_streak: self.options.wedge_streak,
                wedges: team.wedge_count(),
                current: index == current,
            })
            .collect()
    }

    /// Shows the answer of the current question
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedPhase` unless a question awaits an answer.
    pub fn reveal(&mut self) -> Result<&'bank Question, Error> {
        let Phase::AwaitingAnswer { question, wedge } = self.phase else {
            return Err(self.unexpected("reveal the answer"));
        };
        self.phase = Phase::AnswerRevealed { question, wedge };
        Ok(question)
    }

    /// Records whether the active team answered the revealed question
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedPhase` unless an answer is revealed.
    pub fn answer(&mut self, correct: bool) -> Result<Outcome, Error> {
        let Phase::AnswerRevealed { question, wedge } = self.phase else {
            return Err(self.unexpected("mark an answer"));
        };

        if !correct {
            return Ok(self.end_turn());
        }

        if wedge {
            self.game.add_theme_to_current_team(question.theme());
            if let Some(winner) = self.game.winner() {
                let winner = winner.name().to_owned();
                info!(target: "camembert::session", "{winner} wins the game");
                self.phase = Phase::GameOver {
                    winner: winner.clone(),
                };
                return Ok(Outcome::GameOver { winner });
            }
            return Ok(self.end_turn());
        }

        self.streak += 1;
        if self.streak < self.options.wedge_streak {
            let question = draw_question(&mut self.game);
            self.phase = Phase::AwaitingAnswer {
                question,
                wedge: false,
            };
            return Ok(Outcome::NextQuestion);
        }

        match self.game.get_random_question_for_available_themes() {
            Some(offer) => {
                let theme = offer.theme();
                debug!(target: "camembert::session", "wedge offered in {theme}");
                self.phase = Phase::WedgeOffered { theme };
                Ok(Outcome::WedgeOffered(theme))
            }
            None => {
                info!(
                    target: "camembert::session",
                    "no wedge question left for {}",
                    self.game.current_team().name()
                );
                Ok(self.end_turn())
            }
        }
    }

    /// Asks the wedge question for the offered theme
    ///
    /// The turn ends if that theme has no unseen question left.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedPhase` unless a wedge is on offer.
    pub fn accept_wedge(&mut self) -> Result<Outcome, Error> {
        let Phase::WedgeOffered { theme } = self.phase else {
            return Err(self.unexpected("accept a wedge"));
        };

        match self.game.get_question_for_theme(theme) {
            Some(question) => {
                self.phase = Phase::AwaitingAnswer {
                    question,
                    wedge: true,
                };
                Ok(Outcome::NextQuestion)
            }
            None => Ok(self.end_turn()),
        }
    }

    fn end_turn(&mut self) -> Outcome {
        self.game.next_team();
        self.streak = 0;
        let question = draw_question(&mut self.game);
        self.phase = Phase::AwaitingAnswer {
            question,
            wedge: false,
        };
        Outcome::TurnOver {
            next_team: self.game.current_team().name().to_owned(),
        }
    }

    fn unexpected(&self, action: &'static str) -> Error {
        Error::UnexpectedPhase {
            action,
            phase: self.phase.name(),
        }
    }
}

/// Draws the next regular question
///
/// # Panics
///
/// Never in practice: a question bank is never empty, and once every
/// question has been asked the game falls back to the start of the bank.
fn draw_question<'bank, R: RandomSource>(game: &mut Game<'bank, R>) -> &'bank Question {
    game.get_random_questions(1)
        .into_iter()
        .next()
        .expect("a question bank is never empty")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        question::{QuestionBank, sample_bank},
        random::Scripted,
        snapshot::TeamRecord,
    };

    /// A session whose draws always take the first candidate
    fn ordered_session<'a>(bank: &'a QuestionBank, names: &[&str]) -> Session<'a, Scripted> {
        let game = Game::new(bank, names, Scripted::default()).unwrap();
        Session::start(game, Options::default()).unwrap()
    }

    fn restored_session<'a>(bank: &'a QuestionBank, snapshot: Snapshot) -> Session<'a, Scripted> {
        let game = Game::restore(bank, snapshot, Scripted::default()).unwrap();
        Session::start(game, Options::default()).unwrap()
    }

    fn all_but(theme: Theme) -> BTreeSet<Theme> {
        Theme::ALL.into_iter().filter(|t| *t != theme).collect()
    }

    fn two_teams(won_by_a: BTreeSet<Theme>) -> Snapshot {
        Snapshot {
            teams: vec![
                TeamRecord {
                    name: "A".to_string(),
                    won_themes: won_by_a,
                },
                TeamRecord {
                    name: "B".to_string(),
                    won_themes: BTreeSet::new(),
                },
            ],
            ..Snapshot::default()
        }
    }

    fn correct(session: &mut Session<'_, Scripted>) -> Outcome {
        session.reveal().unwrap();
        session.answer(true).unwrap()
    }

    #[test]
    fn test_start_draws_first_question() {
        let bank = sample_bank(3);
        let session = ordered_session(&bank, &["A", "B"]);

        assert_eq!(session.current_question(), Some(&bank[0]));
        assert_eq!(session.streak(), 0);
        assert_eq!(session.game().asked_questions().len(), 1);
        assert!(matches!(
            session.phase(),
            Phase::AwaitingAnswer { wedge: false, .. }
        ));
    }

    #[test]
    fn test_start_rejects_invalid_options() {
        let bank = sample_bank(1);
        let game = Game::new(&bank, ["A", "B"], Scripted::default()).unwrap();
        assert!(matches!(
            Session::start(game, Options::new(0)),
            Err(Error::Options(_))
        ));
    }

    #[test]
    fn test_reveal_shows_correct_answer() {
        let bank = sample_bank(3);
        let mut session = ordered_session(&bank, &["A", "B"]);

        let question = session.reveal().unwrap();
        assert_eq!(question.correct_answer(), Some("A"));
        assert!(matches!(session.phase(), Phase::AnswerRevealed { .. }));
    }

    #[test]
    fn test_incorrect_answer_passes_turn() {
        let bank = sample_bank(3);
        let mut session = ordered_session(&bank, &["A", "B", "C"]);

        assert_eq!(correct(&mut session), Outcome::NextQuestion);
        assert_eq!(session.streak(), 1);

        session.reveal().unwrap();
        assert_eq!(
            session.answer(false).unwrap(),
            Outcome::TurnOver {
                next_team: "B".to_string()
            }
        );
        assert_eq!(session.streak(), 0);
        assert_eq!(session.game().current_team().name(), "B");
        assert!(session.current_question().is_some());
    }

    #[test]
    fn test_scenario_streak_earns_wedge() {
        let bank = sample_bank(3);
        let mut session = ordered_session(&bank, &["A", "B"]);

        assert_eq!(correct(&mut session), Outcome::NextQuestion);
        assert_eq!(correct(&mut session), Outcome::NextQuestion);
        assert_eq!(correct(&mut session), Outcome::WedgeOffered(Theme::Prophets));
        assert_eq!(session.current_question(), None);

        assert_eq!(session.accept_wedge().unwrap(), Outcome::NextQuestion);
        let wedge_question = session.current_question().unwrap();
        assert_eq!(wedge_question.theme(), Theme::Prophets);
        assert!(matches!(
            session.phase(),
            Phase::AwaitingAnswer { wedge: true, .. }
        ));

        assert_eq!(
            correct(&mut session),
            Outcome::TurnOver {
                next_team: "B".to_string()
            }
        );
        let team_a = &session.game().teams()[0];
        assert_eq!(team_a.won_themes(), &BTreeSet::from([Theme::Prophets]));
        assert!(!session.game().current_team_has_won());
        assert_eq!(session.game().current_team().name(), "B");
        assert_eq!(session.streak(), 0);
    }

    #[test]
    fn test_missed_wedge_awards_nothing() {
        let bank = sample_bank(3);
        let mut session = ordered_session(&bank, &["A", "B"]);
        for _ in 0..3 {
            correct(&mut session);
        }
        session.accept_wedge().unwrap();

        session.reveal().unwrap();
        assert!(matches!(
            session.answer(false).unwrap(),
            Outcome::TurnOver { .. }
        ));
        assert_eq!(session.game().teams()[0].wedge_count(), 0);
    }

    #[test]
    fn test_scenario_last_wedge_wins_game() {
        let bank = sample_bank(3);
        let mut session = restored_session(&bank, two_teams(all_but(Theme::Culture)));

        for _ in 0..2 {
            assert_eq!(correct(&mut session), Outcome::NextQuestion);
        }
        assert_eq!(correct(&mut session), Outcome::WedgeOffered(Theme::Culture));
        session.accept_wedge().unwrap();
        assert_eq!(
            correct(&mut session),
            Outcome::GameOver {
                winner: "A".to_string()
            }
        );

        assert!(session.game().current_team_has_won());
        assert_eq!(
            session.phase(),
            &Phase::GameOver {
                winner: "A".to_string()
            }
        );
        assert_eq!(
            session.reveal().unwrap_err(),
            Error::UnexpectedPhase {
                action: "reveal the answer",
                phase: "game over"
            }
        );
        assert!(session.accept_wedge().is_err());
    }

    #[test]
    fn test_wedge_pool_exhausted_ends_turn() {
        let bank = sample_bank(3);
        let mut snapshot = two_teams(all_but(Theme::Culture));
        snapshot.asked_questions = bank.for_theme(Theme::Culture).cloned().collect();
        let mut session = restored_session(&bank, snapshot);

        correct(&mut session);
        correct(&mut session);
        assert_eq!(
            correct(&mut session),
            Outcome::TurnOver {
                next_team: "B".to_string()
            }
        );
        assert_eq!(session.game().teams()[0].wedge_count(), Theme::COUNT - 1);
    }

    #[test]
    fn test_offered_theme_without_question_ends_turn() {
        let bank = sample_bank(1);
        let mut session = restored_session(&bank, two_teams(all_but(Theme::Culture)));

        correct(&mut session);
        correct(&mut session);
        assert_eq!(correct(&mut session), Outcome::WedgeOffered(Theme::Culture));

        // The offer consumed the only Culture question.
        assert_eq!(
            session.accept_wedge().unwrap(),
            Outcome::TurnOver {
                next_team: "B".to_string()
            }
        );
    }

    #[test]
    fn test_actions_out_of_phase_do_not_mutate() {
        let bank = sample_bank(3);
        let mut session = ordered_session(&bank, &["A", "B"]);

        assert!(session.answer(true).is_err());
        assert!(session.accept_wedge().is_err());
        session.reveal().unwrap();
        assert_eq!(
            session.reveal().unwrap_err(),
            Error::UnexpectedPhase {
                action: "reveal the answer",
                phase: "showing the answer"
            }
        );

        assert_eq!(session.streak(), 0);
        assert_eq!(session.game().asked_questions().len(), 1);
    }

    #[test]
    fn test_restored_winner_starts_at_game_over() {
        let bank = sample_bank(3);
        let mut session = restored_session(&bank, two_teams(Theme::ALL.into_iter().collect()));

        assert_eq!(
            session.phase(),
            &Phase::GameOver {
                winner: "A".to_string()
            }
        );
        assert_eq!(session.current_question(), None);
        assert!(session.game().asked_questions().is_empty());
        assert_eq!(
            session.reveal().unwrap_err(),
            Error::UnexpectedPhase {
                action: "reveal the answer",
                phase: "game over"
            }
        );
        assert!(session.answer(true).is_err());
        assert_eq!(session.game().current_team().name(), "A");
    }

    #[test]
    fn test_custom_wedge_streak() {
        let bank = sample_bank(3);
        let game = Game::new(&bank, ["A", "B"], Scripted::default()).unwrap();
        let mut session = Session::start(game, Options::new(1)).unwrap();

        assert!(matches!(correct(&mut session), Outcome::WedgeOffered(_)));
    }

    #[test]
    fn test_scoreboard() {
        let bank = sample_bank(3);
        let mut session = restored_session(&bank, two_teams(BTreeSet::from([Theme::Torah])));
        correct(&mut session);
        correct(&mut session);

        let lines = session.scoreboard();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].current);
        assert_eq!(lines[0].to_string(), "A : 2/3, 1 camembert");
        assert_eq!(lines[1].to_string(), "B : 0/3, 0 camemberts");
    }

    #[test]
    fn test_snapshot_round_trip_restarts_turn() {
        let bank = sample_bank(3);
        let mut session = ordered_session(&bank, &["A", "B"]);
        session.reveal().unwrap();
        session.answer(false).unwrap();

        let snapshot = Snapshot::from_json(&session.snapshot().to_json()).unwrap();
        let resumed = restored_session(&bank, snapshot);

        assert_eq!(resumed.game().current_team().name(), "B");
        assert_eq!(resumed.streak(), 0);
        assert_eq!(resumed.game().asked_questions().len(), 3);
    }

    #[test]
    fn test_options_serde() {
        let options: Options = serde_json::from_str(r#"{"wedgeStreak": 4}"#).unwrap();
        assert_eq!(options.wedge_streak(), 4);
        assert!(options.validate().is_ok());
        assert!(Options::new(11).validate().is_err());
    }
}
