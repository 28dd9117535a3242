use rand::{rngs::StdRng, Rng, SeedableRng};

use subpixel_rs::ops::pixel_shuffle;
use subpixel_rs::tensor::Matrix;
use subpixel_rs::{PixelShuffle, PixelShuffleConfig};

#[test]
fn layer_resolves_geometry_at_construction() {
    let layer = make_layer(12, 4, 4, 2);
    let geometry = layer.geometry();
    assert_eq!(geometry.out_channels, 3);
    assert_eq!(geometry.out_height, 8);
    assert_eq!(geometry.out_width, 8);
    assert_eq!(layer.config().input_rows(), 192);
}

#[test]
fn layer_rejects_non_divisible_channels() {
    let err = PixelShuffle::new(PixelShuffleConfig {
        in_channels: 3,
        in_height: 2,
        in_width: 2,
        upscale_factor: 2,
    })
    .unwrap_err();
    assert!(
        err.to_string().contains("divisible"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn layer_rejects_zero_factor() {
    let err = PixelShuffle::new(PixelShuffleConfig {
        in_channels: 4,
        in_height: 2,
        in_width: 2,
        upscale_factor: 0,
    })
    .unwrap_err();
    assert!(
        err.to_string().contains("upscale factor"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn layer_rejects_zero_dimensions() {
    let err = PixelShuffle::new(PixelShuffleConfig {
        in_channels: 4,
        in_height: 0,
        in_width: 2,
        upscale_factor: 2,
    })
    .unwrap_err();
    assert!(
        err.to_string().contains("positive"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn layer_forward_matches_functional_kernel() {
    let mut rng = seeded_rng(17);
    let layer = make_layer(8, 3, 3, 2);
    let input = random_matrix(&mut rng, layer.config().input_rows(), 3);

    let from_layer = layer.forward(&input).expect("layer forward succeeds");
    let from_kernel =
        pixel_shuffle::forward(layer.geometry(), &input).expect("kernel forward succeeds");
    assert_eq!(
        from_layer.data(),
        from_kernel.data(),
        "cached plan must reproduce the inline kernel"
    );
}

#[test]
fn layer_round_trips_gradients() {
    let mut rng = seeded_rng(29);
    let layer = make_layer(16, 2, 5, 4);
    let input = random_matrix(&mut rng, layer.config().input_rows(), 2);

    let shuffled = layer.forward(&input).expect("forward succeeds");
    assert_eq!(
        shuffled.len(),
        input.len(),
        "the transform redistributes elements without dropping or padding"
    );
    let restored = layer.backward(&shuffled).expect("backward succeeds");
    assert_eq!(
        restored.data(),
        input.data(),
        "backward must restore every element bit-for-bit"
    );
}

#[test]
fn layer_supports_f64_buffers() {
    let layer = make_layer(4, 2, 2, 2);
    let data: Vec<f64> = (0..16).map(|v| v as f64 * 0.5).collect();
    let input = Matrix::from_vec(16, 1, data).expect("input fits extent");

    let shuffled = layer.forward(&input).expect("forward succeeds");
    let restored = layer.backward(&shuffled).expect("backward succeeds");
    assert_eq!(restored.data(), input.data());
}

#[test]
fn layer_rejects_wrong_input_rows() {
    let layer = make_layer(4, 2, 2, 2);
    let input = Matrix::<f32>::zeros(8, 1);
    let err = layer.forward(&input).unwrap_err();
    assert!(
        err.to_string().contains("rows"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn config_serde_round_trips() {
    let config = PixelShuffleConfig {
        in_channels: 12,
        in_height: 4,
        in_width: 6,
        upscale_factor: 2,
    };
    let json = serde_json::to_string(&config).expect("config serializes");
    let restored: PixelShuffleConfig = serde_json::from_str(&json).expect("config deserializes");
    assert_eq!(restored, config);
}

fn make_layer(
    in_channels: usize,
    in_height: usize,
    in_width: usize,
    upscale_factor: usize,
) -> PixelShuffle {
    PixelShuffle::new(PixelShuffleConfig {
        in_channels,
        in_height,
        in_width,
        upscale_factor,
    })
    .expect("layer should construct")
}

fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix<f32> {
    let data = (0..rows * cols).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
    Matrix::from_vec(rows, cols, data).expect("random data fits extent")
}
