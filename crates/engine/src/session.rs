use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use rand::Rng;

const SESSION_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_LEN: usize = 9;

/// Browsing session id shared by every event a tracker records.
///
/// The id is generated once and reused until [`SessionContext::reset`].
#[derive(Debug)]
pub struct SessionContext {
    current: RwLock<String>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self { current: RwLock::new(generate_session_id()) }
    }
}

impl SessionContext {
    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self { current: RwLock::new(session_id.into()) }
    }

    pub fn current(&self) -> String {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Starts a new session and returns its id.
    pub fn reset(&self) -> String {
        let next = generate_session_id();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        next
    }
}

/// `session_{unix millis}_{9 base36 chars}`
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| char::from(SESSION_ALPHABET[rng.gen_range(0..SESSION_ALPHABET.len())]))
        .collect();
    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::{generate_session_id, SessionContext};

    #[test]
    fn generated_ids_follow_the_storefront_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn session_is_stable_until_reset() {
        let session = SessionContext::with_id("session_fixed");
        assert_eq!(session.current(), "session_fixed");
        assert_eq!(session.current(), "session_fixed");

        let next = session.reset();
        assert_ne!(next, "session_fixed");
        assert_eq!(session.current(), next);
    }
}
