//! Credentials-based sign-in: Argon2 password checks and in-process sessions

pub mod credentials;
pub mod password;

pub use credentials::CredentialsProvider;
pub use password::verify_password;
