use std::{env, path::PathBuf};

use dirs;

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Profile file read by the `break-glass` command
pub const BREAK_GLASS_FILE_NAME: &str = "break-glass";

/// Profile file read by the `refresh` command
pub const ROLES_FILE_NAME: &str = "roles";

/// Section holding INI-level defaults rather than a real profile
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Keyword selecting every profile of a profile file
pub const ALL_PROFILES: &str = "all";

/// Session duration used when a profile does not declare a valid one
pub const DEFAULT_DURATION_SECONDS: i32 = 900;

/// Session name for emergency access through `break-glass`
pub const BREAK_GLASS_SESSION_NAME: &str = "break-glass-session";

/// Session name for routine credential refresh
pub const REFRESH_SESSION_NAME: &str = "credential-refresh-session";

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

// Profile file keys
pub const ROLE_ARN_KEY: &str = "aws_role_arn";
pub const MFA_DEVICE_KEY: &str = "aws_mfa_device";
pub const DURATION_KEY: &str = "duration";

// Credentials file keys
pub const ACCESS_KEY_ID_KEY: &str = "aws_access_key_id";
pub const SECRET_ACCESS_KEY_KEY: &str = "aws_secret_access_key";
pub const SECURITY_TOKEN_KEY: &str = "aws_security_token";

/// Resolve a file path from an environment variable, falling back to `~/.aws/<file_name>`
fn aws_file_path(env_var: &str, file_name: &str) -> Option<PathBuf> {
    if let Ok(path) = env::var(env_var) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(file_name))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    aws_file_path("AWS_SHARED_CREDENTIALS_FILE", AWS_CREDENTIALS_FILE_NAME)
}

/// Get the break-glass profile file path
/// Respects AWS_BREAK_GLASS_FILE environment variable if set
pub fn get_break_glass_path() -> Option<PathBuf> {
    aws_file_path("AWS_BREAK_GLASS_FILE", BREAK_GLASS_FILE_NAME)
}

/// Get the routine refresh profile file path
/// Respects AWS_ROLES_FILE environment variable if set
pub fn get_roles_path() -> Option<PathBuf> {
    aws_file_path("AWS_ROLES_FILE", ROLES_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_env<F: FnOnce()>(key: &str, value: Option<&str>, f: F) {
        let original = env::var(key).ok();

        unsafe {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }

        f();

        unsafe {
            match original {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_with_env() {
        with_env(
            "AWS_SHARED_CREDENTIALS_FILE",
            Some("/custom/path/credentials"),
            || {
                let path = get_aws_credentials_path();
                assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));
            },
        );
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_default() {
        with_env("AWS_SHARED_CREDENTIALS_FILE", None, || {
            if let Some(p) = get_aws_credentials_path() {
                let path_str = p.to_string_lossy();
                assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
                assert!(path_str.ends_with(AWS_CREDENTIALS_FILE_NAME));
            }
        });
    }

    #[test]
    #[serial]
    fn test_get_break_glass_path_with_env() {
        with_env("AWS_BREAK_GLASS_FILE", Some("/tmp/bg"), || {
            assert_eq!(get_break_glass_path(), Some(PathBuf::from("/tmp/bg")));
        });
    }

    #[test]
    #[serial]
    fn test_get_break_glass_path_default() {
        with_env("AWS_BREAK_GLASS_FILE", None, || {
            if let Some(p) = get_break_glass_path() {
                assert!(p.ends_with(".aws/break-glass"));
            }
        });
    }

    #[test]
    #[serial]
    fn test_get_roles_path_default() {
        with_env("AWS_ROLES_FILE", None, || {
            if let Some(p) = get_roles_path() {
                assert!(p.ends_with(".aws/roles"));
            }
        });
    }
}
