use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

use subpixel_rs::tensor::{Element, Matrix};
use subpixel_rs::{PixelShuffle, PixelShuffleConfig};

fn main() -> Result<()> {
    let layer = PixelShuffle::new(PixelShuffleConfig {
        in_channels: 8,
        in_height: 3,
        in_width: 3,
        upscale_factor: 2,
    })?;
    let geometry = layer.geometry();
    println!(
        "{}x{}x{} -> {}x{}x{} (factor {})",
        geometry.in_channels,
        geometry.in_height,
        geometry.in_width,
        geometry.out_channels,
        geometry.out_height,
        geometry.out_width,
        geometry.factor
    );

    let mut rng = StdRng::seed_from_u64(42);
    let batch = Matrix::<f32>::randn(layer.config().input_rows(), 2, 1.0, &mut rng);

    let upscaled = layer.forward(&batch)?;
    let restored = layer.backward(&upscaled)?;
    assert_eq!(restored.data(), batch.data());

    let checksum: f32 = upscaled.column(0).iter().map(|v| v.to_f32()).sum();
    println!(
        "shuffled {} columns of {} rows and inverted them exactly (column 0 sum {checksum:.4})",
        upscaled.cols(),
        upscaled.rows()
    );

    Ok(())
}
