//! Simulation error types

use thiserror::Error;

/// Fatal errors that stop a run before any trade is simulated.
///
/// Orders that never fill are not errors; they are simply absent from
/// the buy or sell records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(
        "input and output percent ladders must have the same length: \
         {inputs} input percents != {outputs} output percents"
    )]
    LadderLengthMismatch { inputs: usize, outputs: usize },

    #[error("strategy must define at least one ladder rung")]
    EmptyLadder,

    #[error("start price must be positive, got {0}")]
    NonPositiveStartPrice(f64),

    #[error("start price {0} does not occur in the price history")]
    StartPriceNotFound(f64),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
