//! # Camembert Game Library
//!
//! This library provides the core game logic for a team trivia game:
//! teams take turns answering multiple-choice questions grouped by theme,
//! a streak of correct answers earns a bonus "wedge" question, and the
//! first team to collect a wedge in every theme wins.
//!
//! The engine ([`Game`]) owns turn order, the asked-question history and
//! the wedge records. The turn flow ([`Session`]) drives a game through
//! questions, wedge offers and game over. Rendering and storage belong to
//! the host application, which saves a [`Snapshot`] after each action.
//!
//! ```
//! use camembert::{Game, QuestionBank, Session, session::{Options, Outcome}};
//!
//! let bank = QuestionBank::from_json(r#"[
//!     {"theme": "Torah", "question": "Qui a conduit le peuple hors d'Égypte ?",
//!      "options": ["Moïse", "Josué"], "correctIndex": 0}
//! ]"#).unwrap();
//!
//! let game = Game::new(&bank, ["Lions", "Agneaux"], fastrand::Rng::with_seed(7)).unwrap();
//! let mut session = Session::start(game, Options::default()).unwrap();
//!
//! let question = session.reveal().unwrap();
//! assert_eq!(question.correct_answer(), Some("Moïse"));
//!
//! let outcome = session.answer(false).unwrap();
//! assert_eq!(outcome, Outcome::TurnOver { next_team: "Agneaux".to_string() });
//! ```

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;

pub mod game;
pub mod question;
pub mod random;
pub mod session;
pub mod snapshot;
pub mod team;
pub mod theme;

pub use game::Game;
pub use question::{Question, QuestionBank};
pub use random::RandomSource;
pub use session::Session;
pub use snapshot::Snapshot;
pub use team::Team;
pub use theme::Theme;
