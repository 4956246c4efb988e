use super::AuthError;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued by the identity service for one signed-in user.
///
/// Tokens are wrapped in `SecretString`; `Debug` shows them as `[REDACTED]`.
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Label for status display: the email, or the user id when absent.
    pub fn display_name(&self) -> &str {
        self.user.email.as_deref().unwrap_or(&self.user.id)
    }

    fn to_stored(&self) -> StoredSession {
        StoredSession {
            access_token: self.access_token.expose_secret().to_string(),
            refresh_token: self.refresh_token.expose_secret().to_string(),
            expires_at: self.expires_at.map(|at| at.timestamp()),
            user: self.user.clone(),
        }
    }

    fn from_stored(stored: StoredSession) -> Self {
        Self {
            access_token: SecretString::from(stored.access_token),
            refresh_token: SecretString::from(stored.refresh_token),
            expires_at: stored
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            user: stored.user,
        }
    }
}

/// On-disk shape. Kept private so plain-text tokens never leave this module.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: String,
    expires_at: Option<i64>,
    user: User,
}

// ============================================================================
// Session Store
// ============================================================================

/// JSON file holding the current session between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file → `Ok(None)`. A corrupt file is logged and treated as
    /// signed out.
    pub fn load(&self) -> Result<Option<Session>, AuthError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Io(e)),
        };

        match serde_json::from_str::<StoredSession>(&content) {
            Ok(stored) => Ok(Some(Session::from_stored(stored))),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&session.to_stored())?;
        std::fs::write(&self.path, json)?;

        // Tokens are credentials: user-only access on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) =
                std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
            {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to restrict session file permissions");
            }
        }

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the stored session. Removing a missing file is not an error.
    pub fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            access_token: SecretString::from("access-abc".to_string()),
            refresh_token: SecretString::from("refresh-xyz".to_string()),
            expires_at: DateTime::from_timestamp(1_900_000_000, 0),
            user: User {
                id: "user-1".to_string(),
                email: Some("reader@example.com".to_string()),
            },
        }
    }

    fn temp_store(name: &str) -> (PathBuf, SessionStore) {
        let dir = std::env::temp_dir().join(format!("newsman_session_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let store = SessionStore::new(dir.join("session.json"));
        (dir, store)
    }

    #[test]
    fn debug_masks_tokens() {
        let output = format!("{:?}", session());
        assert!(!output.contains("access-abc"));
        assert!(!output.contains("refresh-xyz"));
        assert!(output.contains("[REDACTED]"));
        assert!(output.contains("reader@example.com"));
    }

    #[test]
    fn save_then_load_keeps_identity() {
        let (dir, store) = temp_store("save_load");
        store.save(&session()).unwrap();

        let loaded = store.load().unwrap().expect("session present");
        assert_eq!(loaded.user.id, "user-1");
        assert_eq!(loaded.access_token.expose_secret(), "access-abc");
        assert_eq!(loaded.expires_at, DateTime::from_timestamp(1_900_000_000, 0));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_signed_out() {
        let (dir, store) = temp_store("missing");
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_is_signed_out() {
        let (dir, store) = temp_store("corrupt");
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, store) = temp_store("perms");
        store.save(&session()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn expiry_and_display_name() {
        let s = session();
        assert!(!s.is_expired(DateTime::from_timestamp(1_000_000_000, 0).unwrap()));
        assert!(s.is_expired(DateTime::from_timestamp(1_900_000_001, 0).unwrap()));
        assert_eq!(s.display_name(), "reader@example.com");
    }
}
