//! Defines the scalar element trait implemented by host-side buffers.

/// Trait describing the numeric behaviour required by matrix storages.
///
/// The rearrangement kernels copy scalars verbatim, so implementations only
/// need identity constructors and `f32` interop for test fixtures; no
/// arithmetic surface is required.
pub trait Element: Copy + Default + Send + Sync + PartialEq + 'static {
    /// Returns the additive identity for the element type.
    fn zero() -> Self;
    /// Converts from a 32-bit float into this element type.
    fn from_f32(v: f32) -> Self;
    /// Converts the element into a 32-bit float for interoperability.
    fn to_f32(self) -> f32;
}

impl Element for f32 {
    fn zero() -> Self {
        0.0
    }

    fn from_f32(v: f32) -> Self {
        v
    }

    fn to_f32(self) -> f32 {
        self
    }
}

impl Element for f64 {
    fn zero() -> Self {
        0.0
    }

    fn from_f32(v: f32) -> Self {
        v as f64
    }

    fn to_f32(self) -> f32 {
        self as f32
    }
}
