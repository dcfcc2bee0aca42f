use crate::error::{self, Result};

use ndarray::{Array1, ArrayView1};

/// A trait to replace all elements in a container with zeros.
pub trait ZeroOut {
    fn zero_out(&mut self);
}

impl<T> ZeroOut for [T]
where
    T: ZeroOut,
{
    fn zero_out(&mut self) {
        for elem in self {
            elem.zero_out();
        }
    }
}

impl ZeroOut for Array1<f64> {
    fn zero_out(&mut self) {
        self.fill(0.0);
    }
}

/// Adds `other` into `acc` elementwise.
pub fn add_assign(what: &'static str, acc: &mut Array1<f64>, other: ArrayView1<f64>) -> Result<()> {
    error::same_len(what, other.len(), acc.len())?;
    *acc += &other;
    Ok(())
}

/// Computes the mean squared error between `actual` and `expected`.
pub fn mean_square_error(actual: ArrayView1<f64>, expected: ArrayView1<f64>) -> Result<f64> {
    error::same_len("error calculation", actual.len(), expected.len())?;
    if actual.is_empty() {
        return Ok(0.0);
    }
    let error: f64 = actual
        .iter()
        .zip(expected.iter())
        .map(|(a, e)| (a - e) * (a - e))
        .sum();
    Ok(error / actual.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn mse_of_known_vectors() {
        let a = arr1(&[1.0, 2.0, 3.0, 4.0]);
        let b = arr1(&[1.0, 0.0, 3.0, 2.0]);
        assert_eq!(mean_square_error(a.view(), b.view()).unwrap(), 2.0);
    }

    #[test]
    fn mse_rejects_mismatched_lengths() {
        let a = arr1(&[1.0, 2.0]);
        let b = arr1(&[1.0]);
        assert!(mean_square_error(a.view(), b.view()).is_err());
    }

    #[test]
    fn add_assign_checks_shape() {
        let mut acc = arr1(&[1.0, 1.0]);
        add_assign("acc", &mut acc, arr1(&[0.5, 2.0]).view()).unwrap();
        assert_eq!(acc, arr1(&[1.5, 3.0]));
        assert!(add_assign("acc", &mut acc, arr1(&[1.0]).view()).is_err());
    }

    #[test]
    fn zero_out_nested() {
        let mut vs = vec![arr1(&[1.0, 2.0]), arr1(&[3.0])];
        vs.zero_out();
        assert_eq!(vs[0], arr1(&[0.0, 0.0]));
        assert_eq!(vs[1], arr1(&[0.0]));
    }
}
