use serde::{Deserialize, Serialize};

use crate::codec::{LoadError, LoadStatus};
use crate::gameplay::ValidationError;
use crate::level::LevelError;

/// Status codes surfaced by loading and session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    FileNotFound,
    AllocationFailure,
    InvalidCharacter,
    /// A level could not be built from its rows.
    MalformedLevel,
    OversizedDropped,
    InvalidLevelSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    Io,
    Format,
    /// Load succeeded but something was skipped; show it, don't abort.
    CapacityWarning,
    ResourceExhausted,
    Validation,
}

impl Status {
    pub fn class(self) -> Option<ErrorClass> {
        match self {
            Status::Ok => None,
            Status::FileNotFound => Some(ErrorClass::Io),
            Status::AllocationFailure => Some(ErrorClass::ResourceExhausted),
            Status::InvalidCharacter | Status::MalformedLevel => Some(ErrorClass::Format),
            Status::OversizedDropped => Some(ErrorClass::CapacityWarning),
            Status::InvalidLevelSet => Some(ErrorClass::Validation),
        }
    }

    pub fn is_fatal(self) -> bool {
        !matches!(self, Status::Ok | Status::OversizedDropped)
    }

    pub fn message(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::FileNotFound => "Could not open file",
            Status::AllocationFailure => "Memory allocation failed",
            Status::InvalidCharacter => "The file contains invalid characters",
            Status::MalformedLevel => "The file contains a malformed level",
            Status::OversizedDropped => "Some levels are too large. Open anyway?",
            Status::InvalidLevelSet => "Some levels are invalid",
        }
    }
}

impl From<LoadStatus> for Status {
    fn from(s: LoadStatus) -> Self {
        match s {
            LoadStatus::Ok => Status::Ok,
            LoadStatus::OversizedDropped => Status::OversizedDropped,
        }
    }
}

impl From<&LoadError> for Status {
    fn from(e: &LoadError) -> Self {
        match e {
            LoadError::FileNotFound { .. } => Status::FileNotFound,
            LoadError::InvalidCharacter { .. } => Status::InvalidCharacter,
            LoadError::Allocation(inner) => Status::from(inner),
        }
    }
}

impl From<&LevelError> for Status {
    fn from(e: &LevelError) -> Self {
        match e {
            LevelError::AllocationFailure(_) => Status::AllocationFailure,
            LevelError::InvalidSize { .. }
            | LevelError::TileCountMismatch { .. }
            | LevelError::InvalidTile { .. } => Status::MalformedLevel,
        }
    }
}

impl From<&ValidationError> for Status {
    fn from(e: &ValidationError) -> Self {
        match e {
            ValidationError::Level(inner) => Status::from(inner),
            _ => Status::InvalidLevelSet,
        }
    }
}

/// How a play or edit session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitCode {
    /// Leave the whole application.
    Quit = 0,
    ReturnToMenu = 1,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_contract() {
        assert_eq!(ExitCode::Quit.code(), 0);
        assert_eq!(ExitCode::ReturnToMenu.code(), 1);
    }

    #[test]
    fn oversized_is_a_soft_warning() {
        assert!(!Status::OversizedDropped.is_fatal());
        assert_eq!(Status::OversizedDropped.class(), Some(ErrorClass::CapacityWarning));
        assert!(Status::InvalidCharacter.is_fatal());
        assert_eq!(Status::Ok.class(), None);
    }

    #[test]
    fn load_errors_map_to_codes() {
        let e = LoadError::InvalidCharacter { line: 1, column: 1, found: 'X' };
        assert_eq!(Status::from(&e), Status::InvalidCharacter);
        let e = LoadError::Allocation(LevelError::AllocationFailure(10));
        assert_eq!(Status::from(&e), Status::AllocationFailure);
        assert_eq!(Status::from(LoadStatus::OversizedDropped), Status::OversizedDropped);
    }

    #[test]
    fn construction_errors_are_not_validation_failures() {
        let e = LevelError::InvalidSize { width: 20, height: 1 };
        assert_eq!(Status::from(&e), Status::MalformedLevel);
        let e = LevelError::TileCountMismatch { expected: 4, found: 3 };
        assert_eq!(Status::from(&e), Status::MalformedLevel);
        assert_eq!(Status::MalformedLevel.class(), Some(ErrorClass::Format));
        assert_ne!(Status::MalformedLevel, Status::InvalidLevelSet);

        let e = ValidationError::Level(LevelError::AllocationFailure(4));
        assert_eq!(Status::from(&e), Status::AllocationFailure);
        assert_eq!(Status::from(&ValidationError::EmptyLevelSet), Status::InvalidLevelSet);
    }
}
