//! End-to-end merge runs.

use image::ImageFormat;
use lopdf::Document;
use pdfstitch::merge::{A4_HEIGHT, A4_WIDTH, stitch};
use pdfstitch::progress::NoProgress;
use pdfstitch::{CancelFlag, InputFile, Merger, QualityTier, finish::finish};
use rstest::rstest;

use crate::common::*;

#[tokio::test]
async fn test_mixed_run_with_one_bad_image() {
    let inputs = vec![
        png_input("A.png", 40, 30),
        corrupt_input("B.png"),
        pdf_input("C.pdf", 2),
    ];

    let mut progress = Vec::new();
    let mut sink = |p: u8| progress.push(p);
    let result = Merger::new(QualityTier::Medium)
        .merge(&inputs, &mut sink, &CancelFlag::new())
        .await
        .expect("run must not fail")
        .expect("non-empty input produces a document");

    assert_eq!(progress, vec![33, 67, 100]);
    assert_eq!(result.statistics.total_pages, 4);
    assert_eq!(result.statistics.recovered, 1);

    let finished = finish(result.document, "", true).await.unwrap();
    let doc = Document::load_mem(&finished.bytes).unwrap();
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 4);

    assert!(has_image(&doc, pages[0]));
    assert_eq!(media_box(&doc, pages[0]), vec![0.0, 0.0, A4_WIDTH, A4_HEIGHT]);

    assert_eq!(shown_text(&doc, pages[1]), vec!["Error loading: B.png"]);
    assert_eq!(media_box(&doc, pages[1]), vec![0.0, 0.0, A4_WIDTH, A4_HEIGHT]);

    assert_eq!(media_box(&doc, pages[2]), vec![0.0, 0.0, 612.0, 792.0]);
    assert_eq!(media_box(&doc, pages[3]), vec![0.0, 0.0, 612.0, 792.0]);
}

#[tokio::test]
async fn test_page_groups_follow_input_order() {
    let inputs = vec![
        InputFile::new("small.pdf", None, pdf_bytes(1, 100, 100)),
        png_input("photo.png", 10, 10),
        InputFile::new("wide.pdf", None, pdf_bytes(3, 800, 200)),
        InputFile::new("tall.pdf", None, pdf_bytes(1, 200, 900)),
    ];

    let result = Merger::new(QualityTier::Low)
        .merge(&inputs, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();

    let doc = result.document.into_document();
    let widths: Vec<f32> = page_ids(&doc)
        .into_iter()
        .map(|id| media_box(&doc, id)[2])
        .collect();
    assert_eq!(widths, vec![100.0, A4_WIDTH, 800.0, 800.0, 800.0, 200.0]);
}

#[tokio::test]
async fn test_reordering_changes_output_order() {
    let first = InputFile::new("first.pdf", None, pdf_bytes(1, 111, 111));
    let second = InputFile::new("second.pdf", None, pdf_bytes(1, 222, 222));

    let merger = Merger::new(QualityTier::Low);
    let forward = merger
        .merge(&[first.clone(), second.clone()], &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap()
        .document
        .into_document();
    let backward = merger
        .merge(&[second, first], &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap()
        .document
        .into_document();

    let first_width = |doc: &Document| media_box(doc, page_ids(doc)[0])[2];
    assert_eq!(first_width(&forward), 111.0);
    assert_eq!(first_width(&backward), 222.0);
}

#[tokio::test]
async fn test_empty_run_produces_nothing() {
    let mut progress = Vec::new();
    let mut sink = |p: u8| progress.push(p);
    let finished = stitch(&[], QualityTier::High, "anything", &mut sink)
        .await
        .unwrap();

    assert!(finished.is_none());
    assert!(progress.is_empty());
}

#[tokio::test]
async fn test_stitch_names_output() {
    let inputs = vec![pdf_input("a.pdf", 1)];
    let finished = stitch(&inputs, QualityTier::Medium, "  Quarterly Report ", &mut NoProgress)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(finished.filename, "Quarterly Report.pdf");
    assert!(finished.bytes.starts_with(b"%PDF-"));
}

#[rstest]
#[case(ImageFormat::Png)]
#[case(ImageFormat::Jpeg)]
#[case(ImageFormat::Bmp)]
#[case(ImageFormat::Tiff)]
#[tokio::test]
async fn test_common_image_formats_become_pages(#[case] format: ImageFormat) {
    let name = format!("picture.{}", format.extensions_str()[0]);
    let inputs = vec![InputFile::new(name, None, image_bytes(12, 9, format))];

    let result = Merger::new(QualityTier::Low)
        .merge(&inputs, &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.statistics.recovered, 0);
    let doc = result.document.into_document();
    assert!(has_image(&doc, page_ids(&doc)[0]));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let inputs: Vec<InputFile> = (0..7).map(|i| pdf_input(&format!("{i}.pdf"), 1)).collect();

    let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    Merger::new(QualityTier::Low)
        .merge(&inputs, &mut tx, &CancelFlag::new())
        .await
        .unwrap();
    drop(tx);

    let mut values = Vec::new();
    while let Some(v) = rx.recv().await {
        values.push(v);
    }
    assert_eq!(values.len(), 7);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(values.last(), Some(&100));
}
