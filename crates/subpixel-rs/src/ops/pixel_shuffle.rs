//! Pixel-shuffle remapping kernels over column-batched buffers.
//!
//! The forward transform redistributes values from the channel dimension into
//! spatial blocks: height and width grow by the upscale factor, channels
//! shrink by its square. The backward transform is the exact inverse index
//! relation, so gradients are routed to precisely the source coordinate each
//! forward element came from. Both directions copy scalars verbatim; no
//! arithmetic is performed and every element has exactly one writer.

use thiserror::Error;

use crate::profiling;
use crate::tensor::{Element, Matrix};

/// Validation failures raised before any output element is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShuffleError {
    #[error("upscale factor must be at least 1, got {factor}")]
    InvalidFactor { factor: usize },
    #[error("invalid pixel-shuffle shape: {message}")]
    InvalidShape { message: String },
}

impl ShuffleError {
    fn shape(message: impl Into<String>) -> Self {
        ShuffleError::InvalidShape {
            message: message.into(),
        }
    }
}

/// Resolved per-call geometry relating the packed and shuffled layouts.
///
/// `out_channels * out_height * out_width == in_channels * in_height *
/// in_width` always holds: the transform redistributes, never drops or pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub in_channels: usize,
    pub out_channels: usize,
    pub in_height: usize,
    pub in_width: usize,
    pub out_height: usize,
    pub out_width: usize,
    pub factor: usize,
}

impl Geometry {
    /// Derives the output geometry from the configured input volume and
    /// upscale factor, validating against the buffer row count `rows`.
    pub fn resolve(
        in_channels: usize,
        in_height: usize,
        in_width: usize,
        factor: usize,
        rows: usize,
    ) -> Result<Self, ShuffleError> {
        if factor < 1 {
            return Err(ShuffleError::InvalidFactor { factor });
        }
        if in_channels == 0 || in_height == 0 || in_width == 0 {
            return Err(ShuffleError::shape(format!(
                "input volume dimensions must be positive, got {in_channels}x{in_height}x{in_width}"
            )));
        }

        let square = factor
            .checked_mul(factor)
            .ok_or_else(|| ShuffleError::shape(format!("squared upscale factor {factor} overflows")))?;
        if in_channels % square != 0 {
            return Err(ShuffleError::shape(format!(
                "input channels ({in_channels}) are not divisible by squared upscale factor ({square})"
            )));
        }

        let volume = in_channels
            .checked_mul(in_height)
            .and_then(|v| v.checked_mul(in_width))
            .ok_or_else(|| {
                ShuffleError::shape(format!(
                    "input volume {in_channels}x{in_height}x{in_width} overflows"
                ))
            })?;
        if volume != rows {
            return Err(ShuffleError::shape(format!(
                "configured volume {in_channels}x{in_height}x{in_width} = {volume} does not match buffer row count {rows}"
            )));
        }

        let out_height = in_height
            .checked_mul(factor)
            .ok_or_else(|| ShuffleError::shape(format!("output height {in_height}*{factor} overflows")))?;
        let out_width = in_width
            .checked_mul(factor)
            .ok_or_else(|| ShuffleError::shape(format!("output width {in_width}*{factor} overflows")))?;

        Ok(Geometry {
            in_channels,
            out_channels: in_channels / square,
            in_height,
            in_width,
            out_height,
            out_width,
            factor,
        })
    }

    /// Returns the flattened volume size, identical for both layouts.
    pub fn rows(&self) -> usize {
        self.in_channels * self.in_height * self.in_width
    }

    fn check_rows<E: Element>(&self, buffer: &Matrix<E>) -> Result<(), ShuffleError> {
        if buffer.rows() != self.rows() {
            return Err(ShuffleError::shape(format!(
                "buffer has {} rows but the resolved geometry expects {}",
                buffer.rows(),
                self.rows()
            )));
        }
        Ok(())
    }
}

#[inline]
fn row_index(channel: usize, row: usize, col: usize, height: usize, width: usize) -> usize {
    (channel * height + row) * width + col
}

/// Applies the depth-to-space rearrangement to every batch column.
///
/// Output coordinate `(oc, oh, ow)` is read from input coordinate
/// `(oc*f*f + (oh%f)*f + ow%f, oh/f, ow/f)`: each `f x f` output block draws
/// one pixel from each of `f*f` consecutive input channels.
pub fn forward<E: Element>(geometry: &Geometry, input: &Matrix<E>) -> Result<Matrix<E>, ShuffleError> {
    let _scope = profiling::functional_scope("subpixel_rs::ops::pixel_shuffle::forward", "index-remap");
    geometry.check_rows(input)?;

    let mut output = Matrix::zeros(input.rows(), input.cols());
    for col in 0..input.cols() {
        forward_column(geometry, input.column(col), output.column_mut(col));
    }
    Ok(output)
}

/// Routes an upstream gradient back through the inverse rearrangement.
///
/// Exact inverse of [`forward`]: input coordinate `(ic, ih, iw)` receives the
/// gradient at `(ic/(f*f), ih*f + (ic%(f*f))/f, iw*f + ic%f)`. Composing the
/// two directions reproduces the original buffer bit-for-bit.
pub fn backward<E: Element>(
    geometry: &Geometry,
    grad_in: &Matrix<E>,
) -> Result<Matrix<E>, ShuffleError> {
    let _scope = profiling::functional_scope("subpixel_rs::ops::pixel_shuffle::backward", "index-remap");
    geometry.check_rows(grad_in)?;

    let mut grad_out = Matrix::zeros(grad_in.rows(), grad_in.cols());
    for col in 0..grad_in.cols() {
        backward_column(geometry, grad_in.column(col), grad_out.column_mut(col));
    }
    Ok(grad_out)
}

fn forward_column<E: Element>(g: &Geometry, input: &[E], output: &mut [E]) {
    let f = g.factor;
    for oc in 0..g.out_channels {
        for oh in 0..g.out_height {
            let ih = oh / f;
            let block_row = oh % f;
            for ow in 0..g.out_width {
                let iw = ow / f;
                let block_col = ow % f;
                let ic = (oc * f + block_row) * f + block_col;
                output[row_index(oc, oh, ow, g.out_height, g.out_width)] =
                    input[row_index(ic, ih, iw, g.in_height, g.in_width)];
            }
        }
    }
}

fn backward_column<E: Element>(g: &Geometry, grad_in: &[E], grad_out: &mut [E]) {
    let f = g.factor;
    let square = f * f;
    for ic in 0..g.in_channels {
        let oc = ic / square;
        let rem = ic % square;
        let block_row = rem / f;
        let block_col = rem % f;
        for ih in 0..g.in_height {
            let oh = ih * f + block_row;
            for iw in 0..g.in_width {
                let ow = iw * f + block_col;
                grad_out[row_index(ic, ih, iw, g.in_height, g.in_width)] =
                    grad_in[row_index(oc, oh, ow, g.out_height, g.out_width)];
            }
        }
    }
}

/// Precomputed row remap for one fixed geometry.
///
/// The rearrangement permutes flattened row indices only and is identical for
/// every batch column, so a single gather vector (`shuffled row -> packed
/// row`) serves both directions: forward gathers through it, backward
/// scatters through it. Callers with a fixed per-layer geometry can build the
/// plan once and skip the per-element index arithmetic of [`forward`] and
/// [`backward`].
#[derive(Debug, Clone)]
pub struct ShufflePlan {
    geometry: Geometry,
    gather: Vec<usize>,
}

impl ShufflePlan {
    pub fn new(geometry: Geometry) -> Self {
        let f = geometry.factor;
        let mut gather = Vec::with_capacity(geometry.rows());
        for oc in 0..geometry.out_channels {
            for oh in 0..geometry.out_height {
                let ih = oh / f;
                let block_row = oh % f;
                for ow in 0..geometry.out_width {
                    let iw = ow / f;
                    let block_col = ow % f;
                    let ic = (oc * f + block_row) * f + block_col;
                    gather.push(row_index(
                        ic,
                        ih,
                        iw,
                        geometry.in_height,
                        geometry.in_width,
                    ));
                }
            }
        }
        debug_assert_eq!(gather.len(), geometry.rows());
        ShufflePlan { geometry, gather }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Borrows the gather vector mapping each shuffled row to its packed source row.
    pub fn forward_rows(&self) -> &[usize] {
        &self.gather
    }

    /// Plan-driven equivalent of [`forward`].
    pub fn apply_forward<E: Element>(&self, input: &Matrix<E>) -> Result<Matrix<E>, ShuffleError> {
        let _scope =
            profiling::functional_scope("subpixel_rs::ops::pixel_shuffle::ShufflePlan::apply_forward", "row-gather");
        self.geometry.check_rows(input)?;

        let mut output = Matrix::zeros(input.rows(), input.cols());
        for col in 0..input.cols() {
            let src = input.column(col);
            let dst = output.column_mut(col);
            for (out_row, &in_row) in self.gather.iter().enumerate() {
                dst[out_row] = src[in_row];
            }
        }
        Ok(output)
    }

    /// Plan-driven equivalent of [`backward`].
    pub fn apply_backward<E: Element>(&self, grad_in: &Matrix<E>) -> Result<Matrix<E>, ShuffleError> {
        let _scope =
            profiling::functional_scope("subpixel_rs::ops::pixel_shuffle::ShufflePlan::apply_backward", "row-scatter");
        self.geometry.check_rows(grad_in)?;

        let mut grad_out = Matrix::zeros(grad_in.rows(), grad_in.cols());
        for col in 0..grad_in.cols() {
            let src = grad_in.column(col);
            let dst = grad_out.column_mut(col);
            for (out_row, &in_row) in self.gather.iter().enumerate() {
                dst[in_row] = src[out_row];
            }
        }
        Ok(grad_out)
    }
}
