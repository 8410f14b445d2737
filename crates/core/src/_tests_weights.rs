#![cfg(test)]

use super::error::Error;
use super::weights::{VoronoiWeights, WeightProvider};

#[test]
fn voronoi_cells_partition_the_band() {
    let weights = VoronoiWeights
        .weights_1d(&[-1.0, 0.0, 2.0], 4.0)
        .unwrap();
    assert!((weights[0] - 3.5).abs() < 1e-12);
    assert!((weights[1] - 1.5).abs() < 1e-12);
    assert!((weights[2] - 3.0).abs() < 1e-12);
    // Cells tile [-B, B] exactly.
    let total: f64 = weights.iter().sum();
    assert!((total - 8.0).abs() < 1e-12);
}

#[test]
fn order_of_samples_does_not_matter() {
    let sorted = VoronoiWeights.weights_1d(&[-1.0, 0.0, 2.0], 4.0).unwrap();
    let shuffled = VoronoiWeights.weights_1d(&[2.0, -1.0, 0.0], 4.0).unwrap();
    assert!((shuffled[0] - sorted[2]).abs() < 1e-12);
    assert!((shuffled[1] - sorted[0]).abs() < 1e-12);
    assert!((shuffled[2] - sorted[1]).abs() < 1e-12);
}

#[test]
fn weights_are_positive_for_scattered_samples() {
    let freqs: Vec<f64> = (0..25)
        .map(|idx| {
            let t = (idx as f64 + 0.37) * 0.618_033_988_749_894_9;
            10.0 * (2.0 * (t - t.floor()) - 1.0)
        })
        .collect();
    let weights = VoronoiWeights.weights_1d(&freqs, 10.0).unwrap();
    assert!(weights.iter().all(|&w| w > 0.0));
}

#[test]
fn out_of_band_sample_is_rejected() {
    let result = VoronoiWeights.weights_1d(&[-1.0, 5.0], 4.0);
    assert!(matches!(result, Err(Error::Weights(_))));
}

#[test]
fn coincident_samples_are_rejected() {
    let result = VoronoiWeights.weights_1d(&[1.0, 1.0, 2.0], 4.0);
    assert!(matches!(result, Err(Error::Weights(_))));
}

#[test]
fn non_positive_bandwidth_is_rejected() {
    assert!(matches!(
        VoronoiWeights.weights_1d(&[0.0], 0.0),
        Err(Error::Weights(_))
    ));
    assert!(matches!(
        VoronoiWeights.weights_1d(&[0.0], f64::NAN),
        Err(Error::Weights(_))
    ));
}

#[test]
fn square_corners_share_one_cell_size() {
    let points = [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]];
    let weights = VoronoiWeights.weights_2d(&points, 2.0).unwrap();
    for &w in &weights {
        assert!((w - 4.0).abs() < 1e-12); // squared nearest-neighbour distance
    }
}

#[test]
fn planar_duplicates_and_outliers_are_rejected() {
    assert!(matches!(
        VoronoiWeights.weights_2d(&[[0.0, 0.0], [0.0, 0.0]], 2.0),
        Err(Error::Weights(_))
    ));
    assert!(matches!(
        VoronoiWeights.weights_2d(&[[0.0, 0.0], [3.0, 0.0]], 2.0),
        Err(Error::Weights(_))
    ));
}
