//! SHA-256 password hashing.

use calendify_core::PasswordHasher;
use sha2::{Digest, Sha256};

pub struct Sha256PasswordHasher;

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn verify(&self, password: &str, password_hash: &str) -> bool {
        self.hash(password) == password_hash
    }
}
