//! Password policy and argon2 hashing.

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;

pub const MIN_LENGTH: usize = 8;
/// Similarity ratio at or above which a password is rejected.
pub const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password12", "password123", "passw0rd", "p@ssw0rd", "123456", "1234567",
    "12345678", "123456789", "1234567890", "qwerty", "qwerty123", "qwertyuiop", "abc123", "abcd1234",
    "111111", "000000", "iloveyou", "letmein", "welcome", "welcome1", "monkey", "dragon", "football",
    "baseball", "sunshine", "princess", "superman", "trustno1", "master", "shadow", "michael",
    "jennifer", "1q2w3e4r", "1qaz2wsx", "zaq12wsx", "admin", "admin123", "administrator", "root",
    "changeme", "secret", "whatever", "starwars", "computer", "internet", "contraseña", "contrasena",
    "barbershop", "haircut",
];

/// Account values a password must not resemble.
#[derive(Debug, Clone, Default)]
pub struct UserAttributes {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
}

impl UserAttributes {
    fn labelled(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(v) = &self.username {
            out.push(("username", v.to_lowercase()));
        }
        if let Some(v) = &self.email {
            out.push(("email address", v.to_lowercase()));
            if let Some((local, _)) = v.split_once('@') {
                out.push(("email address", local.to_lowercase()));
            }
        }
        if let Some(v) = &self.name {
            out.push(("name", v.to_lowercase()));
        }
        if let Some(v) = &self.last_name {
            out.push(("last name", v.to_lowercase()));
        }
        out.retain(|(_, v)| !v.trim().is_empty());
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPolicy;

impl PasswordPolicy {
    /// Every failing rule's message, or `Ok` when the password is acceptable.
    pub fn validate(&self, password: &str, attrs: &UserAttributes) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let lowered = password.to_lowercase();

        for (label, value) in attrs.labelled() {
            if too_similar(&lowered, &value) {
                errors.push(format!("The password is too similar to the {}.", label));
                break;
            }
        }
        if password.chars().count() < MIN_LENGTH {
            errors.push(format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_LENGTH
            ));
        }
        if COMMON_PASSWORDS.contains(&lowered.trim()) {
            errors.push("This password is too common.".to_string());
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            errors.push("This password is entirely numeric.".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn too_similar(password: &str, attribute: &str) -> bool {
    if attribute.chars().count() >= 3 && (password.contains(attribute) || attribute.contains(password)) {
        return true;
    }
    similarity(password, attribute) >= MAX_SIMILARITY
}

/// `2 * lcs / (len_a + len_b)` over characters.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
        }
        prev = cur;
    }
    2.0 * prev[b.len()] as f64 / (a.len() + b.len()) as f64
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
