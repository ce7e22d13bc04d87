//! Capabilities consumed from the auth layer
//!
//! The core never hashes passwords or resolves sessions itself; it consumes
//! both as opaque capabilities behind these traits. The web layer supplies
//! the implementations.

/// Password hashing and verification, supplied by the auth layer
pub trait PasswordAuthenticator {
    /// Hash a plaintext password for storage in a user row
    fn hash(&self, plaintext: &str) -> String;

    /// Verify a plaintext password against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Resolves the current request to a user row key
///
/// Whatever mechanism identified the caller (login session or API key), the
/// core only needs the username to know which row a scoped transaction
/// should open.
pub trait CallerIdentity {
    /// The authenticated caller's username, if any
    fn current_user(&self) -> Option<String>;
}
