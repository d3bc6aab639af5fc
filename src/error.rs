use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A row worker thread could not be created.
    #[error("couldn't spawn worker for row {row}: {source}")]
    Spawn { row: usize, source: io::Error },
    /// The worker pool could not start its threads.
    #[error("couldn't start a pool of {threads} worker threads")]
    PoolSpawn { threads: usize },
    /// A row worker did not run to completion.
    #[error("worker for row {row} did not complete")]
    Join { row: usize },
    #[error("only {completed} of {expected} row workers signalled completion")]
    Incomplete { completed: usize, expected: usize },
    #[error("result has already been printed")]
    AlreadyPrinted,
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("dimension mismatch: {lhs}x{lhs} * {rhs}x{rhs}")]
    DimensionMismatch { lhs: usize, rhs: usize },
    #[error("matrices must have at least one row")]
    Empty,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
