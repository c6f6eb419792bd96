use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid coordinates")]
    InvalidCoords,
    #[error("mines have not been placed yet")]
    MinesNotPlaced,
    #[error("mines are already placed")]
    MinesAlreadyPlaced,
    #[error("mine count does not fit the board")]
    TooManyMines,
    #[error("player name must not be blank")]
    BlankName,
    #[error("action not available in the current phase")]
    WrongPhase,
    #[error("no such level")]
    UnknownLevel,
}

pub type Result<T> = core::result::Result<T, GameError>;
