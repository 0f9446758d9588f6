mod attendance;
mod ids;
mod vocab;

pub use ids::VocabId;

pub use attendance::{
    AttendanceError, AttendanceState, BONUS_STREAK_PERIOD, Buddy, CheckInOutcome, DAILY_SNACKS,
    DISTRESS_AFTER_DAYS, HISTORY_LIMIT, Mood, STREAK_BONUS_SNACKS, SnackOutcome, Treat,
};
pub use vocab::{
    AnswerOutcome, MASTERY_THRESHOLD, STARTER_WORDS, VocabDeck, VocabEntry, VocabError,
    parse_import, parse_import_line,
};
