use thiserror::Error;

use crate::request::Violation;

#[derive(Debug, Error)]
pub enum RollError {
    #[error("{}", render_violations(.0))]
    Invalid(Vec<Violation>),
    #[error("secure random source unavailable: {0}")]
    Entropy(#[source] rand::Error),
    #[error("total of {roll_count} rolls does not fit in a 64-bit integer")]
    Overflow { roll_count: u64 },
    #[error("breakdown of {roll_count} rolls is too large to hold in memory")]
    BreakdownTooLarge { roll_count: u64 },
    #[error("roll worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("invalid engine configuration: {0}")]
    Config(String),
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
