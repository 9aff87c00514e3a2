//! Finishing and writing the merged document.

use lopdf::Document;
use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::finish::{Delivery, FileDelivery, finish};
use pdfstitch::progress::NoProgress;
use pdfstitch::{CancelFlag, Merger, StitchError, load_inputs};
use tempfile::TempDir;

use crate::common::*;

#[tokio::test]
async fn test_files_on_disk_to_written_document() {
    let dir = TempDir::new().unwrap();
    let image_path = dir.path().join("cover.png");
    let pdf_path = dir.path().join("body.pdf");
    std::fs::write(&image_path, image_bytes(20, 10, image::ImageFormat::Png)).unwrap();
    std::fs::write(&pdf_path, pdf_bytes(2, 612, 792)).unwrap();

    let config = Config {
        inputs: vec![image_path, pdf_path],
        output_dir: dir.path().to_path_buf(),
        output_name: "bundle".to_string(),
        overwrite_mode: OverwriteMode::NoClobber,
        ..Config::default()
    };
    config.validate().unwrap();

    let inputs = load_inputs(&config.inputs).await.unwrap();
    let result = Merger::new(config.quality)
        .merge(&inputs, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();
    let finished = finish(result.document, &config.output_name, config.compress)
        .await
        .unwrap();
    let delivered = FileDelivery::new(&config.output_dir, config.overwrite_mode)
        .deliver(finished)
        .await
        .unwrap();

    assert_eq!(delivered.location, config.output_path());
    let written = Document::load(&delivered.location).unwrap();
    assert_eq!(written.get_pages().len(), 3);
}

#[tokio::test]
async fn test_no_clobber_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("merged-document.pdf");
    std::fs::write(&target, b"previous run").unwrap();

    let result = Merger::new(Default::default())
        .merge(&[pdf_input("a.pdf", 1)], &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();
    let finished = finish(result.document, "", true).await.unwrap();
    let err = FileDelivery::new(dir.path(), OverwriteMode::NoClobber)
        .deliver(finished)
        .await
        .unwrap_err();

    assert!(matches!(err, StitchError::OutputExists { .. }));
    assert!(err.is_run_failure());
    assert_eq!(std::fs::read(&target).unwrap(), b"previous run");
}

#[tokio::test]
async fn test_compression_can_be_disabled() {
    let build = || async {
        let result = Merger::new(Default::default())
            .merge(
                &[corrupt_input("x.png"), corrupt_input("y.png")],
                &mut NoProgress,
                &CancelFlag::new(),
            )
            .await
            .unwrap()
            .unwrap();
        result.document
    };

    let compressed = finish(build().await, "c", true).await.unwrap();
    let plain = finish(build().await, "p", false).await.unwrap();

    assert!(String::from_utf8_lossy(&plain.bytes).contains("Error loading: x.png"));

    for finished in [compressed, plain] {
        let doc = Document::load_mem(&finished.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}

#[tokio::test]
async fn test_unreadable_input_path_is_reported() {
    let err = load_inputs(&[std::path::PathBuf::from("/nonexistent/scan.png")]).await.unwrap_err();
    assert!(matches!(err, StitchError::FailedToReadInput { .. }));
    assert_eq!(err.exit_code(), 2);
}
