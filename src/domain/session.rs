use serde::{Deserialize, Serialize};

/// Who the engine is acting for
///
/// Injected by the host; the engine never reads it from global storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub guest: bool,
}

impl SessionContext {
    pub fn authenticated(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            guest: false,
        }
    }

    pub fn guest() -> Self {
        Self {
            session_id: None,
            guest: true,
        }
    }

    /// A guest, or a missing/blank session id, is not authenticated
    pub fn is_authenticated(&self) -> bool {
        !self.guest
            && self
                .session_id
                .as_deref()
                .is_some_and(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authenticated() {
        assert!(SessionContext::authenticated("abc").is_authenticated());
        assert!(!SessionContext::authenticated("  ").is_authenticated());
        assert!(!SessionContext::guest().is_authenticated());
        assert!(!SessionContext::default().is_authenticated());

        let guest_with_id = SessionContext {
            session_id: Some("abc".to_string()),
            guest: true,
        };
        assert!(!guest_with_id.is_authenticated());
    }
}
