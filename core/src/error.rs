use thiserror::Error;

// Hard errors raised to the caller. Ordinary user interaction (a drag that ends
// off-terrain, a ray that misses) never shows up here, see `placement::Rejection`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid terrain: {0}")]
    InvalidTerrain(String),

    // Only produced by elevation sampling on a malformed terrain.
    #[error("cannot sample elevation at ({x}, {z}): terrain has no extent")]
    OutOfBounds { x: f32, z: f32 },

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("persistence unavailable, changes are kept in memory only")]
    PersistenceUnavailable,
}

impl LayoutError {
    pub fn template_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "template",
            id: id.into(),
        }
    }

    pub fn element_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "element",
            id: id.into(),
        }
    }
}

// What a snapshot sink reports back. Never retried by the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("store handle unavailable")]
    Unavailable,

    #[error("store backend failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::LayoutError;

    #[test]
    fn error_messages_name_the_missing_id() {
        let err = LayoutError::template_not_found("tree-huge");
        assert_eq!(err.to_string(), "template `tree-huge` not found");

        let err = LayoutError::element_not_found("el-7");
        assert_eq!(err.to_string(), "element `el-7` not found");
    }
}
