//! Secret configuration values
//!
//! Account keys and API tokens are held in [`SecretString`], a
//! `secrecy::Secret` over a zeroizing [`SecretValue`]. Debug output is
//! redacted and the value is only reachable through `expose_secret()`.
//!
//! ```rust
//! use docsync::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("c2VjcmV0".to_string());
//! assert_eq!(key.expose_secret(), "c2VjcmV0");
//! assert!(!format!("{key:?}").contains("c2VjcmV0"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String wrapper zeroed on drop
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl From<SecretValue> for String {
    fn from(mut s: SecretValue) -> Self {
        std::mem::take(&mut s.0)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string used for account keys and API tokens
pub type SecretString = Secret<SecretValue>;

#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("account-key".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("account-key"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secret_string_opt() {
        assert!(secret_string_opt(None).is_none());
        let key = secret_string_opt(Some("token".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "token");
    }

    #[test]
    fn test_secret_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            key: SecretString,
        }

        let section: Section = toml::from_str("key = \"dGVzdA==\"").unwrap();
        assert_eq!(section.key.expose_secret(), "dGVzdA==");
    }

    #[test]
    fn test_into_string_takes_value() {
        let value = SecretValue::from("abc".to_string());
        let plain: String = value.into();
        assert_eq!(plain, "abc");
    }
}
