//! Question records and the read-only question bank
//!
//! The bank is supplied once by the host application and never mutated by
//! the engine. Its order matters: it is the order used when the asked
//! history is exhausted and reset.

use std::collections::HashSet;

use enum_map::EnumMap;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{constants, theme::Theme};

type ValidationResult = garde::Result;

/// Ensures the correct answer index points into the option list
fn is_option_index(len: usize) -> impl FnOnce(&usize, &()) -> ValidationResult {
    move |index, _| {
        if *index < len {
            Ok(())
        } else {
            Err(garde::Error::new(format!(
                "correct index {index} is outside of the {len} options"
            )))
        }
    }
}

/// A multiple-choice question
///
/// The prompt text doubles as the identity of a question: two records
/// with the same prompt are considered the same question when tracking
/// what has already been asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The theme this question belongs to
    #[garde(skip)]
    theme: Theme,
    /// The prompt shown to the active team
    #[garde(length(min = 1, max = constants::question::MAX_PROMPT_LENGTH))]
    question: String,
    /// Candidate answers in display order
    #[garde(
        length(min = constants::question::MIN_OPTION_COUNT, max = constants::question::MAX_OPTION_COUNT),
        inner(length(min = 1, max = constants::question::MAX_OPTION_LENGTH))
    )]
    options: Vec<String>,
    /// Index of the correct answer within `options`
    #[garde(custom(is_option_index(self.options.len())))]
    correct_index: usize,
}

impl Question {
    /// Creates a question record
    ///
    /// The record is not validated here; [`QuestionBank::new`] validates
    /// every question it accepts.
    pub fn new<S: Into<String>>(
        theme: Theme,
        question: S,
        options: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            theme,
            question: question.into(),
            options,
            correct_index,
        }
    }

    /// The theme this question belongs to
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The prompt text, unique within a bank
    pub fn prompt(&self) -> &str {
        &self.question
    }

    /// Candidate answers in display order
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the correct answer within [`Self::options`]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Text of the correct answer, if the index is in range
    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// Errors that can occur while building a question bank
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bank contains no questions at all
    #[error("question bank is empty")]
    Empty,
    /// A question failed validation
    #[error("question {index} is invalid: {reason}")]
    Invalid {
        /// Position of the offending question in the bank
        index: usize,
        /// Validation report
        reason: String,
    },
    /// Two questions share the same prompt
    #[error("prompt is used by more than one question: {0}")]
    DuplicatePrompt(String),
    /// The bank could not be parsed
    #[error("malformed question bank: {0}")]
    Malformed(String),
}

/// The fixed, ordered collection of questions a game draws from
///
/// Dereferences to the underlying question list in bank order.
#[derive(Debug, Clone, derive_more::Deref)]
pub struct QuestionBank {
    /// All questions in bank order
    #[deref]
    questions: Vec<Question>,
    /// Positions of the questions of each theme, in bank order
    by_theme: EnumMap<Theme, Vec<usize>>,
}

impl QuestionBank {
    /// Builds a bank after validating every question
    ///
    /// # Errors
    ///
    /// * `Error::Empty` - No questions were supplied
    /// * `Error::Invalid` - A question failed validation
    /// * `Error::DuplicatePrompt` - Two questions share a prompt
    pub fn new(questions: Vec<Question>) -> Result<Self, Error> {
        if questions.is_empty() {
            return Err(Error::Empty);
        }

        let mut prompts = HashSet::with_capacity(questions.len());
        let mut by_theme: EnumMap<Theme, Vec<usize>> = EnumMap::default();

        for (index, question) in questions.iter().enumerate() {
            question.validate().map_err(|report| Error::Invalid {
                index,
                reason: report.to_string(),
            })?;
            if !prompts.insert(question.prompt()) {
                return Err(Error::DuplicatePrompt(question.prompt().to_owned()));
            }
            by_theme[question.theme()].push(index);
        }

        log::debug!(
            target: "camembert::question",
            "loaded question bank with {} questions ({})",
            questions.len(),
            Theme::ALL
                .iter()
                .map(|theme| format!("{theme}: {}", by_theme[*theme].len()))
                .join(", ")
        );

        Ok(Self {
            questions,
            by_theme,
        })
    }

    /// Parses and validates a bank from a JSON array of questions
    ///
    /// # Errors
    ///
    /// Returns `Error::Malformed` if the JSON cannot be parsed, or any of
    /// the errors of [`Self::new`].
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let questions: Vec<Question> =
            serde_json::from_str(json).map_err(|e| Error::Malformed(e.to_string()))?;
        Self::new(questions)
    }

    /// Iterates over the questions of one theme, in bank order
    pub fn for_theme(&self, theme: Theme) -> impl Iterator<Item = &Question> {
        self.by_theme[theme].iter().map(|&index| &self.questions[index])
    }

    /// Number of questions available for a theme
    pub fn count_for_theme(&self, theme: Theme) -> usize {
        self.by_theme[theme].len()
    }
}

/// Builds a bank with `per_theme` questions for every theme
///
/// Questions are laid out theme by theme with prompts `"<theme> #<n>"`.
#[cfg(test)]
pub(crate) fn sample_bank(per_theme: usize) -> QuestionBank {
    let questions = Theme::ALL
        .into_iter()
        .flat_map(|theme| {
            (0..per_theme).map(move |n| {
                Question::new(
                    theme,
                    format!("{theme} #{n}"),
                    vec!["A".to_string(), "B".to_string(), "C".to_string()],
                    n % 3,
                )
            })
        })
        .collect_vec();
    QuestionBank::new(questions).expect("sample bank is valid")
}
