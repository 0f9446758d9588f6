use thiserror::Error;

use crate::model::{AttendanceError, VocabError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Attendance(#[from] AttendanceError),
    #[error(transparent)]
    Vocab(#[from] VocabError),
}
