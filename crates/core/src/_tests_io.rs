#![cfg(test)]

use super::io::JobConfig;

#[test]
fn config_parses_with_defaults() {
    let config: JobConfig =
        serde_json::from_str(r#"{ "wavelet": "haar", "scale": 5 }"#).unwrap();
    assert_eq!(config.wavelet, "haar");
    assert_eq!(config.scale, 5);
    assert!(config.bandwidth.is_none());
    assert_eq!(config.solver.max_iter, 200);
    assert!((config.solver.tol - 1e-6).abs() < 1e-18);
    assert!(!config.metrics.enabled);
}

#[test]
fn config_resolves_known_wavelet_names() {
    let config: JobConfig = serde_json::from_str(
        r#"{ "wavelet": "db2", "scale": 4, "bandwidth": 20.0 }"#,
    )
    .unwrap();
    let spec = config.operator_spec().unwrap();
    assert_eq!(spec.wavelet.vanishing_moments(), 2);
    assert!(spec.wavelet.has_boundary());
    assert_eq!(spec.scale, 4);
    assert_eq!(spec.bandwidth, Some(20.0));
}

#[test]
fn unknown_wavelet_name_yields_no_spec() {
    let config: JobConfig =
        serde_json::from_str(r#"{ "wavelet": "coif3", "scale": 4 }"#).unwrap();
    assert!(config.operator_spec().is_none());
}

#[test]
fn solver_options_round_trip() {
    let config: JobConfig = serde_json::from_str(
        r#"{ "wavelet": "haar", "scale": 3, "solver": { "max_iter": 50, "tol": 1e-9 } }"#,
    )
    .unwrap();
    assert_eq!(config.solver.max_iter, 50);
    assert!((config.solver.tol - 1e-9).abs() < 1e-21);
}
