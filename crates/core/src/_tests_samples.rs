#![cfg(test)]

use super::samples::{frac_centered, map_nodes, SampleSet};

#[test]
fn equispaced_1d_set_is_uniform() {
    let set = SampleSet::One((0..32).map(|m| -8.0 + 0.5 * m as f64).collect());
    assert!(set.is_uniform());
    assert_eq!(set.len(), 32);
    assert_eq!(set.dimension(), 1);
}

#[test]
fn scattered_1d_set_is_not_uniform() {
    let set = SampleSet::One(vec![-3.0, -1.0, 0.5, 4.0]);
    assert!(!set.is_uniform());
}

#[test]
fn shuffled_grid_counts_as_non_uniform() {
    // Uniformity is a property of the sample ordering, not just the values.
    let set = SampleSet::One(vec![0.0, 2.0, 1.0, 3.0]);
    assert!(!set.is_uniform());
}

#[test]
fn complete_2d_lattice_is_uniform() {
    let mut points = Vec::new();
    for iy in 0..4 {
        for ix in 0..5 {
            points.push([ix as f64 - 2.0, 2.0 * iy as f64]);
        }
    }
    let set = SampleSet::Two(points);
    assert!(set.is_uniform());
    assert_eq!(set.dimension(), 2);
}

#[test]
fn incomplete_2d_lattice_is_not_uniform() {
    let mut points = Vec::new();
    for iy in 0..3 {
        for ix in 0..3 {
            points.push([ix as f64, iy as f64]);
        }
    }
    points.pop();
    assert!(!SampleSet::Two(points).is_uniform());
}

#[test]
fn axis_coords_extract_each_dimension() {
    let set = SampleSet::Two(vec![[1.0, -2.0], [3.0, 4.0]]);
    assert_eq!(set.axis_coords(0), vec![1.0, 3.0]);
    assert_eq!(set.axis_coords(1), vec![-2.0, 4.0]);
}

#[test]
fn frac_centered_lands_in_half_open_interval() {
    assert_eq!(frac_centered(0.25), 0.25);
    assert_eq!(frac_centered(0.5), -0.5);
    assert_eq!(frac_centered(-0.5), -0.5);
    assert_eq!(frac_centered(1.75), -0.25);
    assert_eq!(frac_centered(-2.25), -0.25);
}

#[test]
fn map_nodes_divides_by_extent_then_wraps() {
    let nodes = map_nodes(&[-8.0, 0.0, 4.0, 9.0], 16);
    assert_eq!(nodes, vec![-0.5, 0.0, 0.25, -0.4375]);
}
