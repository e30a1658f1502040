//! Configuration constants for the Camembert game engine
//!
//! This module contains the fixed limits and rules used throughout the
//! engine so that validation and turn logic share one source of truth.

/// Team setup constants
pub mod team {
    /// Minimum number of teams in a game
    pub const MIN_COUNT: usize = 2;
    /// Maximum number of teams in a game
    pub const MAX_COUNT: usize = 3;
    /// Maximum length of a team name in characters
    pub const MAX_NAME_LENGTH: usize = 30;
}

/// Question record constants
pub mod question {
    /// Maximum length of a question prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 500;
    /// Minimum number of answer options for a question
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of answer options for a question
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a single answer option in characters
    pub const MAX_OPTION_LENGTH: usize = 200;
}

/// Turn flow constants
pub mod turn {
    /// Consecutive correct answers needed to be offered a wedge question
    pub const STREAK_FOR_WEDGE: usize = 3;
    /// Smallest configurable wedge streak
    pub const MIN_STREAK_FOR_WEDGE: usize = 1;
    /// Largest configurable wedge streak
    pub const MAX_STREAK_FOR_WEDGE: usize = 10;
}
