//! Pixel-shuffle layer over column-batched feature maps.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::ops::pixel_shuffle::{Geometry, ShufflePlan};
use crate::tensor::{Element, Matrix};

/// Construction-time configuration scalars.
///
/// All fields must be positive; `in_channels` must be divisible by
/// `upscale_factor` squared. An enclosing serialization mechanism persists
/// these scalars verbatim — the layer itself holds no learned state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelShuffleConfig {
    pub in_channels: usize,
    pub in_height: usize,
    pub in_width: usize,
    pub upscale_factor: usize,
}

impl PixelShuffleConfig {
    /// Returns the flattened row count forward inputs must carry.
    pub fn input_rows(&self) -> usize {
        self.in_channels * self.in_height * self.in_width
    }
}

/// Parameter-free layer rearranging channel depth into spatial resolution.
///
/// The geometry is fixed at construction, so the row remap is resolved once
/// into a [`ShufflePlan`] and reused for every call. `forward` and `backward`
/// are stateless beyond that cached plan and behave identically in training
/// and inference.
#[derive(Debug, Clone)]
pub struct PixelShuffle {
    config: PixelShuffleConfig,
    plan: ShufflePlan,
}

impl PixelShuffle {
    pub fn new(config: PixelShuffleConfig) -> Result<Self> {
        ensure!(
            config.in_channels > 0 && config.in_height > 0 && config.in_width > 0,
            "pixel shuffle dimensions must be positive, got {}x{}x{}",
            config.in_channels,
            config.in_height,
            config.in_width
        );
        let geometry = Geometry::resolve(
            config.in_channels,
            config.in_height,
            config.in_width,
            config.upscale_factor,
            config.input_rows(),
        )?;
        Ok(Self {
            config,
            plan: ShufflePlan::new(geometry),
        })
    }

    pub fn config(&self) -> &PixelShuffleConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        self.plan.geometry()
    }

    /// Rearranges `(in_channels, H, W)` columns into `(in_channels / f^2, H*f, W*f)`.
    pub fn forward<E: Element>(&self, input: &Matrix<E>) -> Result<Matrix<E>> {
        let _scope = crate::profiling::layer_scope("PixelShuffle::forward");
        Ok(self.plan.apply_forward(input)?)
    }

    /// Routes the upstream gradient back to the packed layout.
    pub fn backward<E: Element>(&self, upstream: &Matrix<E>) -> Result<Matrix<E>> {
        let _scope = crate::profiling::layer_scope("PixelShuffle::backward");
        Ok(self.plan.apply_backward(upstream)?)
    }
}
