use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("Insufficient shares: got {got}, need {need}")]
    InsufficientShares { got: usize, need: usize },
    #[error("Insufficient valid shares: {valid} passed verification, need {need}")]
    InsufficientValidShares { valid: usize, need: usize },
    #[error("No valid combination found after {attempts} attempts")]
    NoValidCombination { attempts: usize },
    #[error("Invalid threshold configuration: t={t}, n={n}")]
    InvalidThreshold { t: usize, n: usize },
    #[error("Failed to combine shares: {0}")]
    Combine(String),
}
