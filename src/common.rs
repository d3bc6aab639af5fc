use std::{fmt, num::NonZeroUsize, thread};

use nalgebra as na;
use num_traits::{WrappingAdd, WrappingMul, Zero};

pub type Int = i32;

pub const DIM: usize = 3;

pub const A: [[Int; DIM]; DIM] = [
    [1, 2, 3],
    [4, 5, 6],
    [7, 8, 9],
];

pub const B: [[Int; DIM]; DIM] = [
    [9, 8, 7],
    [6, 5, 4],
    [3, 2, 1],
];

/// Anything that can be stored in the matrices and multiplied row by row. Sums and products wrap
/// on overflow instead of panicking, so a worker never fails on arithmetic.
pub trait Element:
    na::Scalar + Copy + Zero + WrappingAdd + WrappingMul + fmt::Display + Send + Sync
{
}

impl<T> Element for T where
    T: na::Scalar + Copy + Zero + WrappingAdd + WrappingMul + fmt::Display + Send + Sync
{
}

/// Mutable view over a single row of a `DMatrix`, as handed out by `row_iter_mut`.
pub type RowMut<'a, T> = na::MatrixSliceMut<'a, T, na::U1, na::Dynamic, na::U1, na::Dynamic>;

pub fn from_rows<T: Element, const N: usize>(rows: &[[T; N]; N]) -> na::DMatrix<T> {
    na::DMatrix::from_fn(N, N, |r, c| rows[r][c])
}

/// Builds the two input matrices of the program. They are owned by the caller for the duration of
/// the computation.
pub fn fixed_inputs() -> (na::DMatrix<Int>, na::DMatrix<Int>) {
    (from_rows(&A), from_rows(&B))
}

pub fn identity<T: Element + num_traits::One>(n: usize) -> na::DMatrix<T> {
    na::DMatrix::from_fn(n, n, |r, c| if r == c { T::one() } else { T::zero() })
}

pub fn hardware_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
