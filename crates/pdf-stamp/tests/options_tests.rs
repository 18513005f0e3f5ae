use pdf_stamp::*;
use std::path::PathBuf;

fn valid_options() -> StampingOptions {
    StampingOptions {
        input_paths: vec![PathBuf::from("in.pdf")],
        output_dir: Some(PathBuf::from("out")),
        stamp_image: Some(PathBuf::from("stamp.png")),
        ..Default::default()
    }
}

#[test]
fn test_validation_no_input_files() {
    let options = StampingOptions::default();
    assert!(matches!(options.validate(), Err(StampError::NoInputs)));
}

#[test]
fn test_validation_output_mode() {
    let mut options = valid_options();
    assert!(options.validate().is_ok());
    assert!(!options.is_in_place());

    // No output directory means replace in place
    options.output_dir = None;
    assert!(options.validate().is_ok());
    assert!(options.is_in_place());

    options.output_dir = Some(PathBuf::new());
    match options.validate() {
        Err(StampError::Config(msg)) => assert!(msg.contains("Output directory")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_validation_stamp_image_settings() {
    let mut options = valid_options();
    options.stamp_image = None;
    assert!(options.validate().is_err());

    let mut options = valid_options();
    options.opacity_percent = 101;
    assert!(options.validate().is_err());

    let mut options = valid_options();
    options.stamp_width_mm = 0.0;
    assert!(options.validate().is_err());

    let mut options = valid_options();
    options.rotation_degrees = f32::NAN;
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_seam_settings() {
    let mut options = valid_options();
    options.seam.scope = SeamScope::Custom;
    assert!(options.validate().is_err());

    options.seam.custom_pages = vec![1, 2];
    assert!(options.validate().is_ok());

    options.seam.offset_percent = 120.0;
    assert!(options.validate().is_err());

    options.seam.offset_percent = 0.0;
    options.seam.max_batch_size = 0;
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_page_settings() {
    let mut options = valid_options();
    options.page.scope = PageScope::Custom;
    assert!(options.validate().is_err());

    options.page.custom_pages = vec![3];
    assert!(options.validate().is_ok());

    options.page.position = PagePosition::new(1.5, 0.5);
    assert!(options.validate().is_err());
    options.page.position = PagePosition::new(1.0, 0.0);
    assert!(options.validate().is_ok());

    options
        .page
        .overrides
        .insert(3, PagePosition::new(f32::INFINITY, 0.5));
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_signature_modes() {
    let mut options = valid_options();

    options.signature.mode = SignatureMode::SelfSigned;
    let err = options.validate().unwrap_err();
    assert!(matches!(err, StampError::Unsupported(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    options.signature.mode = SignatureMode::CustomCertificate;
    assert!(options.validate().is_err());

    options.signature.certificate_path = Some(PathBuf::from("signer.pem"));
    assert!(options.validate().is_ok());

    options.output_password = Some("secret".to_string());
    assert!(options.is_encrypting());
    assert!(options.validate().is_err());

    // An empty password means no encryption
    options.output_password = Some(String::new());
    assert!(!options.is_encrypting());
    assert!(options.validate().is_ok());
}

#[test]
fn test_page_position_overrides() {
    let mut page = PageStampOptions {
        position: PagePosition::new(0.2, 0.8),
        ..Default::default()
    };
    page.overrides.insert(2, PagePosition::new(0.5, 0.5));

    assert_eq!(page.position_for(1), PagePosition::new(0.2, 0.8));
    assert_eq!(page.position_for(2), PagePosition::new(0.5, 0.5));
}

#[test]
fn test_seam_side_from_str() {
    assert_eq!(SeamSide::try_from("Left").unwrap(), SeamSide::Left);
    assert_eq!(SeamSide::try_from(" bottom ").unwrap(), SeamSide::Bottom);
    assert!(matches!(
        SeamSide::try_from("diagonal"),
        Err(StampError::UnsupportedSide(_))
    ));
}

#[test]
fn test_seam_offset_ratio_clamped() {
    let mut seam = SeamStampOptions::default();
    assert_eq!(seam.offset_ratio(), 0.5);
    seam.offset_percent = 250.0;
    assert_eq!(seam.offset_ratio(), 1.0);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("options.json");

    let mut options = valid_options();
    options.seam.scope = SeamScope::Even;
    options.seam.side = SeamSide::Top;
    options.page.scope = PageScope::SkipLast;
    options.page.overrides.insert(4, PagePosition::new(0.1, 0.2));
    options.page.jitter_seed = Some(7);
    options.signature.reason = Some("Approved".to_string());

    options.save(&path).await.unwrap();
    let loaded = StampingOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);

    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"side\": \"top\""));
    assert!(json.contains("\"scope\": \"skip-last\""));
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_config_uses_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{ "seam": { "scope": "all", "side": "LEFT" } }"#).unwrap();

    let options = StampingOptions::load(&path).await.unwrap();
    assert_eq!(options.seam.scope, SeamScope::All);
    assert_eq!(options.seam.side, SeamSide::Left);
    assert_eq!(options.seam.max_batch_size, 20);
    assert_eq!(options.output_suffix, "_stamped");
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_invalid_side_in_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "seam": { "side": "middle" } }"#).unwrap();

    assert!(matches!(
        StampingOptions::load(&path).await,
        Err(StampError::Config(_))
    ));
}
