//! Inputs that cannot be processed are replaced, never fatal.

use pdfstitch::progress::NoProgress;
use pdfstitch::{CancelFlag, InputFile, Merger, QualityTier, StitchError};
use pdfstitch::merge::InputOutcome;
use rstest::rstest;
use std::time::Duration;

use crate::common::*;

async fn run_single(input: InputFile) -> (InputOutcome, lopdf::Document) {
    let mut result = Merger::new(QualityTier::Low)
        .merge(&[input], &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.statistics.total_pages, 1);
    let outcome = result.outcomes.remove(0);
    (outcome, result.document.into_document())
}

#[rstest]
#[case("notes.png", Some("image/png"), b"not an image".to_vec())]
#[case("drawing.svg", Some("image/svg+xml"), br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec())]
#[case("empty.jpg", None, Vec::new())]
#[tokio::test]
async fn test_undecodable_images_get_placeholder(
    #[case] name: &str,
    #[case] mime: Option<&str>,
    #[case] bytes: Vec<u8>,
) {
    let (outcome, doc) = run_single(InputFile::new(name, mime.map(str::to_string), bytes)).await;

    assert!(matches!(
        outcome,
        InputOutcome::Recovered {
            error: StitchError::AssetDecode { .. },
            ..
        }
    ));
    assert_eq!(
        shown_text(&doc, page_ids(&doc)[0]),
        vec![format!("Error loading: {name}")]
    );
}

#[tokio::test]
async fn test_broken_pdf_gets_placeholder() {
    let (outcome, doc) = run_single(InputFile::new(
        "broken.pdf",
        Some("application/pdf".into()),
        b"%PDF-1.7\n%%EOF".to_vec(),
    ))
    .await;

    assert!(matches!(
        outcome,
        InputOutcome::Recovered {
            error: StitchError::DocumentParse { .. },
            ..
        }
    ));
    assert_eq!(shown_text(&doc, page_ids(&doc)[0]), vec!["Error loading: broken.pdf"]);
}

#[tokio::test]
async fn test_pdf_without_pages_gets_placeholder() {
    let (outcome, _doc) =
        run_single(InputFile::new("blank.pdf", None, pdf_bytes(0, 612, 792))).await;

    assert!(outcome.is_recovered());
}

#[tokio::test]
async fn test_image_named_pdf_is_treated_as_document() {
    // A .pdf name wins over an image MIME type, so PNG bytes fail as a document.
    let input = InputFile::new(
        "mislabelled.pdf",
        Some("image/png".into()),
        image_bytes(4, 4, image::ImageFormat::Png),
    );
    let (outcome, _doc) = run_single(input).await;

    assert!(matches!(
        outcome,
        InputOutcome::Recovered {
            error: StitchError::DocumentParse { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_non_ascii_name_is_sanitized() {
    let (_, doc) = run_single(corrupt_input("Übersicht.png")).await;
    assert_eq!(
        shown_text(&doc, page_ids(&doc)[0]),
        vec!["Error loading: ?bersicht.png"]
    );
}

#[tokio::test]
async fn test_slow_decode_times_out_and_is_recovered() {
    let inputs = vec![png_input("huge.png", 800, 800), pdf_input("after.pdf", 1)];

    let result = Merger::new(QualityTier::Medium)
        .with_decode_timeout(Some(Duration::from_millis(1)))
        .merge(&inputs, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(
        result.outcomes[0],
        InputOutcome::Recovered {
            error: StitchError::DecodeTimeout { .. },
            ..
        }
    ));
    assert!(!result.outcomes[1].is_recovered());
    assert_eq!(result.statistics.total_pages, 2);
}

#[tokio::test]
async fn test_every_input_failing_still_produces_document() {
    let inputs: Vec<InputFile> = (0..3).map(|i| corrupt_input(&format!("{i}.png"))).collect();

    let result = Merger::new(QualityTier::High)
        .merge(&inputs, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.statistics.recovered, 3);
    assert_eq!(result.document.page_count(), 3);
}
