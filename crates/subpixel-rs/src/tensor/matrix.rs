//! Column-batched host buffer used by the rearrangement kernels and tests.

use anyhow::{bail, Result};
use rand::Rng;

use super::storage::Element;

/// Dense 2D host buffer of `rows x cols` scalars.
///
/// Storage is column-major: each column is one batch sample and occupies a
/// contiguous run of `rows` elements. Rows hold a flattened
/// `(channel, height, width)` volume in channel-major row-major order, i.e.
/// row `(c * height + h) * width + w` holds pixel `(h, w)` of channel `c`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<E> {
    rows: usize,
    cols: usize,
    data: Vec<E>,
}

impl<E: Element> Matrix<E> {
    /// Constructs a matrix from raw values, validating the length against the shape.
    ///
    /// `data` is consumed in column-major order: the first `rows` values form
    /// column 0, the next `rows` values column 1, and so on.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<E>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| anyhow::anyhow!("matrix extent {rows}x{cols} overflows usize"))?;
        if data.len() != expected {
            bail!(
                "matrix data length ({}) does not match extent {}x{}",
                data.len(),
                rows,
                cols
            );
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Returns a zero-initialized matrix of the requested extent.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![E::zero(); rows * cols],
        }
    }

    /// Samples from a normal distribution (`N(0, std^2)`) using the Box-Muller transform.
    pub fn randn(rows: usize, cols: usize, std: f32, rng: &mut impl Rng) -> Self {
        let len = rows * cols;
        let mut values = Vec::with_capacity(len);
        while values.len() < len {
            let u1: f32 = rng.gen::<f32>().max(f32::MIN_POSITIVE);
            let u2: f32 = rng.gen::<f32>();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = r * theta.cos() * std;
            let z1 = r * theta.sin() * std;
            values.push(E::from_f32(z0));
            if values.len() < len {
                values.push(E::from_f32(z1));
            }
        }
        Matrix {
            rows,
            cols,
            data: values,
        }
    }

    /// Returns the number of rows (flattened volume size).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns (batch samples).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the total number of stored elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Reports whether the buffer holds zero elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows the full payload in column-major order.
    pub fn data(&self) -> &[E] {
        &self.data
    }

    /// Mutably borrows the full payload in column-major order.
    pub fn data_mut(&mut self) -> &mut [E] {
        &mut self.data
    }

    /// Borrows one batch column as a contiguous slice, panicking when out of range.
    pub fn column(&self, col: usize) -> &[E] {
        assert!(
            col < self.cols,
            "column index {col} out of range for {} columns",
            self.cols
        );
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    /// Mutably borrows one batch column, panicking when out of range.
    pub fn column_mut(&mut self, col: usize) -> &mut [E] {
        assert!(
            col < self.cols,
            "column index {col} out of range for {} columns",
            self.cols
        );
        &mut self.data[col * self.rows..(col + 1) * self.rows]
    }
}
