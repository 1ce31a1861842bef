//! Secret references in config values.
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and takes the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used verbatim

use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("failed to run `pass show {path}`: {source}")]
    PassSpawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pass show {path}` failed ({status}): {stderr}")]
    PassFailed {
        path: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`pass show {0}` produced no output")]
    PassEmpty(String),
}

/// Resolves a possibly-referenced secret value.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(path) = value.strip_prefix("pass::") {
        from_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string()))
    } else {
        Ok(value.to_string())
    }
}

/// True if `value` points elsewhere instead of holding the secret itself.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

fn from_pass(path: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .args(["show", path])
        .output()
        .map_err(|source| SecretError::PassSpawn {
            path: path.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            path: path.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| SecretError::PassEmpty(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(resolve("s3cret").unwrap(), "s3cret");
        assert_eq!(resolve("").unwrap(), "");
        assert!(!is_reference("s3cret"));
    }

    #[test]
    fn env_reference() {
        unsafe {
            std::env::set_var("_CONTESTCAL_TEST_SECRET", "from-env");
        }
        assert!(is_reference("env::_CONTESTCAL_TEST_SECRET"));
        assert_eq!(resolve("env::_CONTESTCAL_TEST_SECRET").unwrap(), "from-env");
        unsafe {
            std::env::remove_var("_CONTESTCAL_TEST_SECRET");
        }
    }

    #[test]
    fn missing_env_reference() {
        let err = resolve("env::_CONTESTCAL_UNSET_VAR_4711").unwrap_err();
        assert!(matches!(err, SecretError::MissingEnv(ref v) if v == "_CONTESTCAL_UNSET_VAR_4711"));
    }

    #[test]
    fn missing_pass_entry() {
        // fails whether or not `pass` is installed
        assert!(resolve("pass::contestcal/does/not/exist/4711").is_err());
    }
}
