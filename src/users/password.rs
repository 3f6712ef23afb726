use secrecy::{ExposeSecret, SecretString};

/// Hash a password using bcrypt.
///
/// # Errors
/// Returns the bcrypt error if hashing fails.
pub fn hash_password(password: &SecretString) -> Result<String, bcrypt::BcryptError> {
    // Use a lower cost factor for debug builds and tests
    let cost = if cfg!(debug_assertions) { 4 } else { bcrypt::DEFAULT_COST };
    bcrypt::hash(password.expose_secret(), cost)
}
