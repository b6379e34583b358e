pub mod config;
pub mod credentials;
pub mod logger;

pub use config::Settings;
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, StoreError};

#[cfg(test)]
mod tests;
