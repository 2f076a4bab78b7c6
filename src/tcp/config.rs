use thiserror::Error;

/// Maximum payload bytes carried by a single outbound segment. The
/// reference value used by the upstream lab this crate's protocol core is
/// modeled on.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

/// Errors rejected at construction time. The protocol core itself never
/// fails at runtime (see `src/tcp/*`'s silent-clip/drop/latch behavior).
/// This is strictly about catching unusable configuration before a
/// `TCPSender` is built.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial RTO must be nonzero")]
    ZeroInitialRto,

    #[error("max payload size must be nonzero")]
    ZeroMaxPayloadSize,
}

/// Tunable parameters for a [`crate::tcp::sender::TCPSender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderConfig {
    pub initial_rto_ms: u64,
    pub max_payload_size: usize,
}

impl SenderConfig {
    pub fn new(initial_rto_ms: u64, max_payload_size: usize) -> Result<Self, ConfigError> {
        let config = SenderConfig {
            initial_rto_ms,
            max_payload_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_rto_ms == 0 {
            return Err(ConfigError::ZeroInitialRto);
        }
        if self.max_payload_size == 0 {
            return Err(ConfigError::ZeroMaxPayloadSize);
        }
        Ok(())
    }
}
