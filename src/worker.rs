use nalgebra as na;

use crate::common::{Element, RowMut};

/// Computes one row of `a * b` into `out`.
///
/// Implementors are shared by reference between all row workers, hence the `Sync` bound. `out`
/// is the only part of the result a worker can reach, so the rows written by different workers
/// never overlap.
pub trait RowKernel<T: Element>: Sync {
    fn compute_row(&self, row: usize, a: &na::DMatrix<T>, b: &na::DMatrix<T>, out: RowMut<'_, T>);
}

/// Plain dot products of row `row` of `a` with every column of `b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DotProduct;

impl<T: Element> RowKernel<T> for DotProduct {
    fn compute_row(
        &self,
        row: usize,
        a: &na::DMatrix<T>,
        b: &na::DMatrix<T>,
        mut out: RowMut<'_, T>,
    ) {
        debug_assert_eq!(a.ncols(), b.nrows());
        debug_assert_eq!(out.ncols(), b.ncols());

        let a_row = a.row(row);

        for (col, slot) in out.iter_mut().enumerate() {
            *slot = a_row
                .iter()
                .zip(b.column(col).iter())
                .fold(T::zero(), |acc, (x, y)| acc.wrapping_add(&x.wrapping_mul(y)));
        }
    }
}
