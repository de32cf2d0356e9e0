use hex::encode as hex_encode;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::config::DEFAULT_PBKDF2_ITERATIONS;
use crate::error::AppError;
use crate::models::{CurrentUser, Role};

/// Demo accounts, one per role. Passwords are hashed when the store is built.
pub const DEMO_CREDENTIALS: [(Role, &str, &str); 4] = [
    (Role::Admin, "admin", "admin123"),
    (Role::PropertyManager, "manager", "manager123"),
    (Role::FinanceTeam, "finance", "finance123"),
    (Role::DataEngineer, "engineer", "engineer123"),
];

#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Fixed role-to-credential table, immutable after startup.
pub struct CredentialStore {
    entries: Vec<Credential>,
}

impl CredentialStore {
    pub fn demo() -> Self {
        Self::demo_with_iterations(DEFAULT_PBKDF2_ITERATIONS)
    }

    pub fn demo_with_iterations(iterations: u32) -> Self {
        let entries = DEMO_CREDENTIALS
            .iter()
            .map(|(role, username, password)| Credential {
                username: username.to_string(),
                password_hash: generate_password_hash(password, iterations),
                role: *role,
            })
            .collect();
        Self { entries }
    }

    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = Vec::new();
        for e in &self.entries {
            if !roles.contains(&e.role) {
                roles.push(e.role);
            }
        }
        roles
    }

    /// Exact match on role and username, then a hash check on the password.
    pub fn authenticate(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<CurrentUser, AppError> {
        self.entries
            .iter()
            .find(|e| {
                e.role == role
                    && e.username == username
                    && verify_password(&e.password_hash, password)
            })
            .map(|e| CurrentUser {
                username: e.username.clone(),
                role: e.role,
            })
            .ok_or(AppError::InvalidCredentials)
    }
}

pub fn generate_password_hash(password: &str, iterations: u32) -> String {
    let mut salt_bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex_encode(salt_bytes);
    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut dk);
    let hash_hex = hex_encode(dk);
    format!("pbkdf2:sha256:{}${}${}", iterations, salt, hash_hex)
}

pub fn verify_password(stored: &str, candidate: &str) -> bool {
    if let Some(rest) = stored.strip_prefix("pbkdf2:sha256:") {
        if let Some((iter_s, salt_hash)) = rest.split_once('$') {
            if let Some((salt, expected_hash)) = salt_hash.split_once('$') {
                if let Ok(iter) = iter_s.parse::<u32>() {
                    let mut dk = [0u8; 32];
                    pbkdf2_hmac::<Sha256>(candidate.as_bytes(), salt.as_bytes(), iter, &mut dk);
                    let computed = hex_encode(dk);
                    return computed == expected_hash;
                }
            }
        }
    }
    false
}

pub fn random_session_id() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex_encode(b)
}
