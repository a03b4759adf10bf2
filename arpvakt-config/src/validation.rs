//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that a detector command is a plausible executable name.
pub fn validate_command(command: &str) -> Result<(), ValidationError> {
    if command.trim().is_empty() || command.contains('\0') {
        return Err(ValidationError::new("invalid_command"));
    }
    Ok(())
}

/// Validate that an SMTP host is non-empty and free of whitespace.
pub fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.is_empty() || host.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::new("invalid_host"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_command() {
        assert!(validate_command("  ").is_err());
        assert!(validate_command("python3").is_ok());
    }

    #[test]
    fn rejects_host_with_spaces() {
        assert!(validate_host("smtp .example.com").is_err());
        assert!(validate_host("smtp.example.com").is_ok());
    }
}
