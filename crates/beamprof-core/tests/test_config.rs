use beamprof_core::config::{FitConfig, ProfilerConfig, ProjectionConfig};
use beamprof_core::consts::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_PROJECTION_SCALE, DEFAULT_WIDTH_GUESS,
};

#[test]
fn test_defaults_carry_documented_constants() {
    let config = ProfilerConfig::default();
    assert_eq!(config.projection.scale, DEFAULT_PROJECTION_SCALE);
    assert_eq!(config.projection.bucket_size, None);
    assert_eq!(config.fit.width_guess, DEFAULT_WIDTH_GUESS);
    assert_eq!(config.fit.max_iterations, DEFAULT_MAX_ITERATIONS);
}

#[test]
fn test_empty_document_deserializes_to_defaults() {
    let config: ProfilerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.projection.scale, DEFAULT_PROJECTION_SCALE);
    assert_eq!(config.fit.width_guess, DEFAULT_WIDTH_GUESS);
}

#[test]
fn test_serialization_round_trip() {
    let config = ProfilerConfig {
        projection: ProjectionConfig {
            scale: 25.0,
            bucket_size: Some(3),
        },
        fit: FitConfig {
            width_guess: 120.0,
            max_iterations: 50,
            tolerance: 1e-8,
        },
    };

    let json = serde_json::to_string(&config).unwrap();
    let back: ProfilerConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(back.projection.scale, 25.0);
    assert_eq!(back.projection.bucket_size, Some(3));
    assert_eq!(back.fit.width_guess, 120.0);
    assert_eq!(back.fit.max_iterations, 50);
}

#[test]
fn test_validate_rejects_zero_bucket() {
    let mut config = ProfilerConfig::default();
    config.projection.bucket_size = Some(0);
    assert!(config.validate().is_err());

    config.projection.bucket_size = Some(3);
    assert!(config.validate().is_ok());

    config.projection.bucket_size = None;
    assert!(config.validate().is_ok());
}
