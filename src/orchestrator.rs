use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{self, AtomicUsize},
        Mutex, PoisonError,
    },
    thread,
};

use nalgebra as na;

use scoped_pool::Pool;

use crate::{
    common::Element,
    error::{Error, Result},
    report,
    worker::RowKernel,
};

/// How the row workers are mapped onto OS threads. Either way there is exactly one worker per row
/// of the result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A freshly spawned scoped thread for every row
    #[default]
    ThreadPerRow,
    /// Every row is a job on a pool of `threads` threads
    Pool { threads: usize },
}

/// ```text
/// Init -> Spawning -> AwaitingCompletion -> Printing -> Done
///            |               |                 |
///            '---------------+-----------------+-----> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Spawning,
    AwaitingCompletion,
    Printing,
    Done,
    Failed,
}

impl Phase {
    fn next(self) -> Option<Phase> {
        match self {
            Phase::Init => Some(Phase::Spawning),
            Phase::Spawning => Some(Phase::AwaitingCompletion),
            Phase::AwaitingCompletion => Some(Phase::Printing),
            Phase::Printing => Some(Phase::Done),
            Phase::Done | Phase::Failed => None,
        }
    }
}

/// Fans one worker out per row of the result, joins them all, and only then lets the result be
/// read. An orchestrator runs a single multiplication.
#[derive(Debug)]
pub struct Orchestrator {
    strategy: Strategy,
    stack_size: Option<usize>,
    phase: Phase,
    expected: usize,
    completed: usize,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl Orchestrator {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            stack_size: None,
            phase: Phase::Init,
            expected: 0,
            completed: 0,
        }
    }

    /// Stack size in bytes for the threads of `Strategy::ThreadPerRow`. Pool threads keep the
    /// pool's default.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    fn advance(&mut self, to: Phase) {
        assert_eq!(
            self.phase.next(),
            Some(to),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            to
        );
        log::debug!("{:?} -> {:?}", self.phase, to);
        self.phase = to;
    }

    fn fail(&mut self, e: Error) -> Error {
        log::debug!("{:?} -> {:?}: {}", self.phase, Phase::Failed, e);
        self.phase = Phase::Failed;
        e
    }

    /// Computes `a * b` with one worker per row, running `kernel` for each of them. Returns once
    /// every worker has finished; on success the orchestrator is left in
    /// `Phase::AwaitingCompletion` with the barrier satisfied, ready for [`Self::print`].
    ///
    /// # Panics
    ///
    /// If called on an orchestrator that has already run.
    pub fn multiply<T: Element, K: RowKernel<T>>(
        &mut self,
        a: &na::DMatrix<T>,
        b: &na::DMatrix<T>,
        kernel: &K,
    ) -> Result<na::DMatrix<T>> {
        assert_eq!(self.phase, Phase::Init, "orchestrator has already run");

        let n = check_shapes(a, b).map_err(|e| self.fail(e))?;
        let mut c = na::DMatrix::zeros(n, n);
        self.expected = n;

        self.advance(Phase::Spawning);

        let (completed, time) = crate::measure_time(|| match self.strategy {
            Strategy::ThreadPerRow => self.thread_per_row(a, b, &mut c, kernel),
            Strategy::Pool { threads } => self.pooled(threads, a, b, &mut c, kernel),
        });
        let completed = completed.map_err(|e| self.fail(e))?;
        self.completed = completed;

        if completed != n {
            return Err(self.fail(Error::Incomplete {
                completed,
                expected: n,
            }));
        }

        log::info!("{n} row workers finished in {time:?} ({:?})", self.strategy);
        Ok(c)
    }

    /// Writes the report for `c`. Only allowed after a successful [`Self::multiply`].
    pub fn print<T: Element, W: io::Write>(&mut self, c: &na::DMatrix<T>, w: &mut W) -> Result<()> {
        // Done is terminal, a repeated print doesn't turn it into Failed
        if self.phase == Phase::Done {
            return Err(Error::AlreadyPrinted);
        }
        if self.phase != Phase::AwaitingCompletion || self.completed != self.expected {
            return Err(self.fail(Error::Incomplete {
                completed: self.completed,
                expected: self.expected,
            }));
        }

        self.advance(Phase::Printing);
        report::write_matrix(w, c, report::MIN_WIDTH).map_err(|e| self.fail(e.into()))?;
        self.advance(Phase::Done);
        Ok(())
    }

    /// [`Self::multiply`] followed by [`Self::print`].
    pub fn run<T: Element, K: RowKernel<T>, W: io::Write>(
        &mut self,
        a: &na::DMatrix<T>,
        b: &na::DMatrix<T>,
        kernel: &K,
        w: &mut W,
    ) -> Result<na::DMatrix<T>> {
        let c = self.multiply(a, b, kernel)?;
        self.print(&c, w)?;
        Ok(c)
    }

    /// Returns the number of workers that completed.
    fn thread_per_row<T: Element, K: RowKernel<T>>(
        &mut self,
        a: &na::DMatrix<T>,
        b: &na::DMatrix<T>,
        c: &mut na::DMatrix<T>,
        kernel: &K,
    ) -> Result<usize> {
        let stack_size = self.stack_size;

        thread::scope(|s| {
            let mut handles = Vec::with_capacity(c.nrows());
            let mut spawn_error = None;

            for (row, out) in c.row_iter_mut().enumerate() {
                let mut builder = thread::Builder::new().name(format!("row-{row}"));
                if let Some(bytes) = stack_size {
                    builder = builder.stack_size(bytes);
                }

                let spawned = builder.spawn_scoped(s, move || {
                    log::trace!("row {row}: start");
                    kernel.compute_row(row, a, b, out);
                    log::trace!("row {row}: done");
                });

                match spawned {
                    Ok(h) => handles.push((row, h)),
                    Err(source) => {
                        spawn_error = Some(Error::Spawn { row, source });
                        break;
                    }
                }
            }

            // The workers that did start hold views into `c`, so they are joined even if a later
            // spawn failed.
            self.advance(Phase::AwaitingCompletion);

            let mut completed = 0;
            let mut join_error = None;
            for (row, h) in handles {
                match h.join() {
                    Ok(()) => completed += 1,
                    Err(_) => {
                        join_error.get_or_insert(Error::Join { row });
                    }
                }
            }

            match spawn_error.or(join_error) {
                Some(e) => Err(e),
                None => Ok(completed),
            }
        })
    }

    /// Returns the number of workers that completed.
    fn pooled<T: Element, K: RowKernel<T>>(
        &mut self,
        threads: usize,
        a: &na::DMatrix<T>,
        b: &na::DMatrix<T>,
        c: &mut na::DMatrix<T>,
        kernel: &K,
    ) -> Result<usize> {
        // A pool without threads would never run the jobs, and `scoped` would wait forever
        if threads == 0 {
            return Err(Error::PoolSpawn { threads });
        }

        // `Pool::new` panics if it can't start its threads
        let pool = panic::catch_unwind(|| Pool::new(threads))
            .map_err(|_| Error::PoolSpawn { threads })?;

        let completed = AtomicUsize::new(0);
        let failed = Mutex::new(Vec::new());

        pool.scoped(|s| {
            let completed_ref = &completed;
            let failed_ref = &failed;

            for (row, out) in c.row_iter_mut().enumerate() {
                s.execute(move || {
                    log::trace!("row {row}: start");
                    // A panicking job would otherwise take the whole scope down with it
                    let res =
                        panic::catch_unwind(AssertUnwindSafe(|| kernel.compute_row(row, a, b, out)));

                    match res {
                        Ok(()) => {
                            completed_ref.fetch_add(1, atomic::Ordering::Relaxed);
                            log::trace!("row {row}: done");
                        }
                        Err(_) => failed_ref
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(row),
                    }
                });
            }

            // The scope joins every job before `scoped` returns
            self.advance(Phase::AwaitingCompletion);
        });

        pool.shutdown();

        let failed = failed.into_inner().unwrap_or_else(PoisonError::into_inner);
        match failed.into_iter().min() {
            Some(row) => Err(Error::Join { row }),
            None => Ok(completed.into_inner()),
        }
    }
}

/// Computes `a * b` with the default kernel. Returns the product once every row worker has joined.
pub fn multiply<T: Element>(
    a: &na::DMatrix<T>,
    b: &na::DMatrix<T>,
    strategy: Strategy,
) -> Result<na::DMatrix<T>> {
    Orchestrator::new(strategy).multiply(a, b, &crate::worker::DotProduct)
}

fn check_shapes<T: Element>(a: &na::DMatrix<T>, b: &na::DMatrix<T>) -> Result<usize> {
    for m in [a, b] {
        let (rows, cols) = m.shape();
        if rows != cols {
            return Err(Error::NotSquare { rows, cols });
        }
    }

    match (a.nrows(), b.nrows()) {
        (0, _) | (_, 0) => Err(Error::Empty),
        (lhs, rhs) if lhs != rhs => Err(Error::DimensionMismatch { lhs, rhs }),
        (n, _) => Ok(n),
    }
}
