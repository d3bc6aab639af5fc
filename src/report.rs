use std::{fmt::Write as _, io};

use nalgebra as na;

use crate::common::Element;

pub const HEADER: &str = "Resultant Matrix C = A x B:";

/// Narrowest field an element is printed in.
pub const MIN_WIDTH: usize = 4;

/// Renders the header followed by one line per row, every element right-aligned in a field of at
/// least `width` (and never less than `MIN_WIDTH`) characters.
pub fn format_matrix<T: Element>(m: &na::DMatrix<T>, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let mut s = String::with_capacity(HEADER.len() + 1 + m.nrows() * (m.ncols() * width + 1));

    s.push_str(HEADER);
    s.push('\n');

    for row in m.row_iter() {
        for x in row.iter() {
            // Writing into a String can't fail
            let _ = write!(s, "{:>width$}", x, width = width);
        }
        s.push('\n');
    }

    s
}

/// Writes the whole report at once, so a reader never sees half a grid.
pub fn write_matrix<T: Element, W: io::Write>(
    w: &mut W,
    m: &na::DMatrix<T>,
    width: usize,
) -> io::Result<()> {
    w.write_all(format_matrix(m, width).as_bytes())?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common;

    #[test]
    fn matches_expected_output() {
        let c = common::from_rows(&[[30, 24, 18], [84, 69, 54], [138, 114, 90]]);
        assert_eq!(
            format_matrix(&c, MIN_WIDTH),
            "Resultant Matrix C = A x B:\n  30  24  18\n  84  69  54\n 138 114  90\n"
        );
    }

    #[test]
    fn wide_values_overflow_the_field() {
        let c = common::from_rows(&[[-12345]]);
        assert_eq!(format_matrix(&c, MIN_WIDTH), format!("{HEADER}\n-12345\n"));
    }

    #[test]
    fn width_is_clamped_to_minimum() {
        let c = common::from_rows(&[[1, 2], [3, 4]]);
        assert_eq!(format_matrix(&c, 1), format_matrix(&c, MIN_WIDTH));
        assert_eq!(format_matrix(&c, 6), format!("{HEADER}\n     1     2\n     3     4\n"));
    }

    #[test]
    fn write_matrix_emits_header_once() {
        let c = common::from_rows(&[[1, 0], [0, 1]]);
        let mut buf = Vec::new();
        write_matrix(&mut buf, &c, MIN_WIDTH).unwrap();

        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.matches(HEADER).count(), 1);
        assert!(out.starts_with(HEADER));
        assert_eq!(out.lines().count(), 3);
    }
}
