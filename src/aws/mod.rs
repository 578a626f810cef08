use aws_smithy_types::DateTime;

pub mod credentials;
pub mod sts;

/// AWS temporary credentials structure
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// Reported by STS; never persisted
    pub expiration: Option<DateTime>,
}

pub use credentials::CredentialsStore;
pub use sts::{AssumeRole, AssumeRoleRequest, MfaToken, StsRoleAssumer};
