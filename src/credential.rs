//! API credential handling.

use crate::error::{Result, VeoClipError};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// An API key for the Gemini Developer API.
///
/// Immutable once resolved. `Debug` never prints the full key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps an explicit key.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        Self::resolve(Some(key.into()), None)
    }

    /// Reads the key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, std::env::var(API_KEY_ENV).ok())
    }

    /// Picks the explicit key if present, otherwise the environment value.
    ///
    /// Blank keys count as missing.
    pub fn resolve(explicit: Option<String>, env_value: Option<String>) -> Result<Self> {
        explicit
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_value.filter(|k| !k.trim().is_empty()))
            .map(|k| Self(k.trim().to_string()))
            .ok_or_else(|| {
                VeoClipError::Configuration(format!(
                    "{API_KEY_ENV} not set and no API key provided. \
                     Set {API_KEY_ENV}=your-api-key or pass the key explicitly."
                ))
            })
    }

    /// Returns the raw key for request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the key with everything but its edges hidden, e.g. `AIzaSyAB...wxyz`.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let cred = Credential::resolve(Some("explicit".into()), Some("from-env".into())).unwrap();
        assert_eq!(cred.expose(), "explicit");
    }

    #[test]
    fn test_falls_back_to_env_value() {
        let cred = Credential::resolve(None, Some("from-env".into())).unwrap();
        assert_eq!(cred.expose(), "from-env");
    }

    #[test]
    fn test_missing_key_names_env_var() {
        let err = Credential::resolve(None, None).unwrap_err();
        assert!(matches!(err, VeoClipError::Configuration(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_blank_keys_are_missing() {
        assert!(Credential::resolve(Some("   ".into()), None).is_err());
        let cred = Credential::resolve(Some(String::new()), Some("env-key".into())).unwrap();
        assert_eq!(cred.expose(), "env-key");
    }

    #[test]
    fn test_masked() {
        let cred = Credential::new("AIzaSyABCDEFGHIJKLwxyz").unwrap();
        assert_eq!(cred.masked(), "AIzaSyAB...wxyz");
        assert_eq!(Credential::new("short").unwrap().masked(), "*****");
    }

    #[test]
    fn test_debug_hides_key() {
        let cred = Credential::new("AIzaSyABCDEFGHIJKLwxyz").unwrap();
        let debug = format!("{cred:?}");
        assert!(!debug.contains("CDEFGHIJKL"));
    }
}
