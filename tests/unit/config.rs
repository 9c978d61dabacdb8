use super::*;

#[test]
fn empty_document_uses_defaults() {
    let cfg = StageConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, StageConfig::default());
    assert_eq!(cfg.default_size, ISize::new(800, 600));
}

#[test]
fn partial_documents_override_fields() {
    let cfg = StageConfig::from_json_str(
        r#"{ "default_size": { "w": 320, "h": 240 }, "pacing": { "target_fps": 30 }, "threads": 2 }"#,
    )
    .unwrap();
    assert_eq!(cfg.default_size, ISize::new(320, 240));
    assert_eq!(cfg.pacing.sleep_threshold_ms, 2.0);
    assert_eq!(cfg.threads, Some(2));

    let pacing = cfg.pacing.to_pacing();
    assert_eq!(pacing.target_interval_secs, 1.0 / 30.0);
    assert_eq!(pacing.sleep_threshold_secs, 0.002);
}

#[test]
fn fps_sign_selects_the_pacing_mode() {
    let display = PacingSettings::default().to_pacing();
    assert_eq!(display.target_interval_secs, 0.0);
    let uncapped = PacingSettings {
        target_fps: -1.0,
        ..PacingSettings::default()
    }
    .to_pacing();
    assert_eq!(uncapped.resolve_interval(Some(0.01)), None);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        StageConfig::from_json_str(r#"{ "threads": 0 }"#),
        Err(StageError::Validation(_))
    ));
    assert!(matches!(
        StageConfig::from_json_str(r#"{ "default_size": { "w": 0, "h": 10 } }"#),
        Err(StageError::Validation(_))
    ));
    assert!(matches!(
        StageConfig::from_json_str(r#"{ "pacing": { "sleep_threshold_ms": -1 } }"#),
        Err(StageError::Validation(_))
    ));
    assert!(matches!(
        StageConfig::from_json_str("not json"),
        Err(StageError::Serde(_))
    ));
}
