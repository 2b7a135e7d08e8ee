//! Error types for the access loop.

/// Result type alias for access loop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the access loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reader or output line fault.
    #[error(transparent)]
    Hardware(#[from] fobgate_hardware::HardwareError),

    /// Invalid allowlist or configuration.
    #[error(transparent)]
    Core(#[from] fobgate_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fobgate_hardware::HardwareError;

    #[test]
    fn test_hardware_error_is_transparent() {
        let err: Error = HardwareError::disconnected("PN532").into();
        assert_eq!(err.to_string(), "Device disconnected: PN532");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: Error = fobgate_core::Error::Config("hold must be positive".into()).into();
        assert_eq!(err.to_string(), "Configuration error: hold must be positive");
    }
}
