use thiserror::Error;

/// Construction-time failures of teams, formations and match setup.
///
/// Runtime staleness (a pass target that no longer exists after a restart,
/// an unknown last toucher) is never reported through this type; the engine
/// skips the affected step for that tick instead.
#[derive(Error, Debug)]
pub enum TouchlineError {
    #[error("Invalid formation '{name}': expected 10 outfield players, found {outfield}")]
    InvalidFormation { name: String, outfield: u32 },

    #[error("Invalid team size: expected at least {expected}, found {found}")]
    InvalidTeamSize { expected: usize, found: usize },

    #[error("Unknown role '{role}'. Known roles: {known}")]
    UnknownRole { role: String, known: String },

    #[error("Attribute {attribute} must be between 1 and 100, got {value}")]
    AttributeOutOfRange { attribute: &'static str, value: u8 },

    #[error("Unsupported formation: {0}")]
    UnsupportedFormation(String),

    #[error("Not enough {role} players for formation {formation}")]
    RoleShortage { role: String, formation: String },

    #[error("Duplicate player id {id} in match line-ups")]
    DuplicatePlayerId { id: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TouchlineError {
    /// Setup errors caused by bad roster data rather than the environment.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, TouchlineError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, TouchlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_message_lists_known_roles() {
        let err = TouchlineError::UnknownRole {
            role: "ST".to_string(),
            known: "CD, CF, GK".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown role 'ST'. Known roles: CD, CF, GK");
        assert!(err.is_data_error());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TouchlineError = io.into();
        assert!(!err.is_data_error());
        assert!(err.to_string().starts_with("IO error"));
    }
}
