use std::fmt;

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const ROUNDS: u32 = 100_000;
const DIGEST_LENGTH: usize = 32;

/// Salted PBKDF2-SHA256 digest of an account password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    pub fn derive(password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = to_hex(&salt);
        let digest = stretch(&salt, password);
        Self { salt, digest }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        let digest = stretch(&self.salt, candidate);
        digest.as_bytes().ct_eq(self.digest.as_bytes()).into()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

fn stretch(salt: &str, password: &str) -> String {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), ROUNDS, &mut digest);
    to_hex(&digest)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Password policy: at least eight characters with a letter and a digit.
pub(crate) fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if password.chars().count() < 8 {
        problems.push("password must contain at least 8 characters");
    }
    if !password.chars().any(char::is_alphabetic) {
        problems.push("password must contain a letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("password must contain a digit");
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_original_and_rejects_others() {
        let hash = PasswordHash::derive("correct horse 1");
        assert!(hash.verify("correct horse 1"));
        assert!(!hash.verify("correct horse 2"));
    }

    #[test]
    fn stretch_matches_the_pbkdf2_sha256_reference() {
        // RFC 7914 section 11, first PBKDF2-HMAC-SHA256 vector (1 iteration).
        let mut digest = [0u8; 64];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut digest);
        assert_eq!(to_hex(&digest[..8]), "55ac046e56e3089f");

        let stored = PasswordHash::derive("classroom42");
        assert_eq!(stored.digest.len(), DIGEST_LENGTH * 2);
        assert_eq!(stretch(&stored.salt, "classroom42"), stored.digest);
    }

    #[test]
    fn salts_differ_between_derivations() {
        let first = PasswordHash::derive("same-password-9");
        let second = PasswordHash::derive("same-password-9");
        assert_ne!(first, second);
    }

    #[test]
    fn debug_output_is_redacted() {
        let hash = PasswordHash::derive("secret-value-1");
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }

    #[test]
    fn policy_reports_each_problem() {
        assert_eq!(password_problems("abc").len(), 2);
        assert!(password_problems("longenough1").is_empty());
        assert_eq!(
            password_problems("12345678"),
            vec!["password must contain a letter"]
        );
    }
}
