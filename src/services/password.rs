use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::error::AppError;

/// How user passwords are written to the store.
///
/// `Plaintext` keeps the stored format compatible with existing databases.
/// Switching to `Argon2` requires running
/// [`UserService::migrate_passwords`](crate::services::UserService::migrate_passwords).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordScheme {
    #[default]
    Plaintext,
    Argon2,
}

impl FromStr for PasswordScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plaintext" | "plain" => Ok(Self::Plaintext),
            "argon2" => Ok(Self::Argon2),
            other => Err(format!("unknown password storage: {other}")),
        }
    }
}

impl PasswordScheme {
    /// Turn a password typed by a user into its stored form.
    pub fn encode(&self, password: &str) -> Result<String, AppError> {
        match self {
            Self::Plaintext => Ok(password.to_string()),
            Self::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AppError::Password(e.to_string()))
            }
        }
    }

    /// Check a candidate against a stored password in either format.
    pub fn verify(stored: &str, candidate: &str) -> bool {
        match argon2_hash(stored) {
            Some(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            None => stored == candidate,
        }
    }
}

/// A stored value counts as hashed only if it parses as an argon2 PHC string.
/// Anything else, including plaintext that merely starts with `$argon2`, is
/// compared verbatim.
pub fn is_hashed(stored: &str) -> bool {
    argon2_hash(stored).is_some()
}

fn argon2_hash(stored: &str) -> Option<PasswordHash<'_>> {
    PasswordHash::new(stored)
        .ok()
        .filter(|hash| hash.algorithm.as_str().starts_with("argon2") && hash.hash.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_is_stored_verbatim() {
        let stored = PasswordScheme::Plaintext.encode("pw123").unwrap();
        assert_eq!(stored, "pw123");
        assert!(PasswordScheme::verify(&stored, "pw123"));
        assert!(!PasswordScheme::verify(&stored, "PW123"));
    }

    #[test]
    fn test_argon2_round_trip() {
        let stored = PasswordScheme::Argon2.encode("pw123").unwrap();
        assert!(is_hashed(&stored));
        assert_ne!(stored, "pw123");
        assert!(PasswordScheme::verify(&stored, "pw123"));
        assert!(!PasswordScheme::verify(&stored, "wrong"));
    }

    #[test]
    fn test_argon2_lookalike_plaintext_is_compared_verbatim() {
        for stored in ["$argon2-is-my-password", "$argon2id$garbage", "$argon2"] {
            assert!(!is_hashed(stored), "{stored} treated as a hash");
            assert!(PasswordScheme::verify(stored, stored));
            assert!(!PasswordScheme::verify(stored, "something else"));
        }
    }

    #[test]
    fn test_parse_scheme() {
        assert_eq!("argon2".parse::<PasswordScheme>(), Ok(PasswordScheme::Argon2));
        assert_eq!("Plaintext".parse::<PasswordScheme>(), Ok(PasswordScheme::Plaintext));
        assert!("md5".parse::<PasswordScheme>().is_err());
    }
}
