use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("phase `{phase}` has non-positive duration {duration}")]
    NonPositivePhase { phase: &'static str, duration: f32 },
    #[error("`{0}` is not a choice right now")]
    UnknownChoice(String),
    #[error("the dialogue has already ended")]
    DialogueFinished,
    #[error("dialogue node {0} does not exist")]
    MissingNode(usize),
}

pub type Result<T> = std::result::Result<T, CoreError>;
