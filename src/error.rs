use thiserror::Error;

/// Recoverable game/room errors. A failed operation never mutates state;
/// errors are reported to the initiating caller only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("only the host can do that")]
    NotHost,
    #[error("at least 3 players are needed to start")]
    TooFewPlayers,
    #[error("room not found")]
    RoomNotFound,
    #[error("the game has already started")]
    RoomAlreadyStarted,
    #[error("room codes are 6 letters or digits")]
    InvalidCode,
    #[error("display name must not be empty")]
    EmptyName,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("that action is not allowed in the current phase")]
    WrongPhase,
}

impl GameError {
    /// Stable machine-readable code for `error` replies.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotHost => "NOT_HOST",
            GameError::TooFewPlayers => "TOO_FEW_PLAYERS",
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::RoomAlreadyStarted => "ROOM_ALREADY_STARTED",
            GameError::InvalidCode => "INVALID_CODE",
            GameError::EmptyName => "EMPTY_NAME",
            GameError::UnknownPlayer => "UNKNOWN_PLAYER",
            GameError::WrongPhase => "WRONG_PHASE",
        }
    }
}
