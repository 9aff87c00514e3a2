//! Working set lifecycle and access handle release.

use pdfstitch::progress::NoProgress;
use pdfstitch::{CancelFlag, Merger, QualityTier, StitchError, WorkingSet};

use crate::common::*;

#[tokio::test]
async fn test_reordered_set_merges_in_new_order() {
    let mut set = WorkingSet::new();
    let a = set.add(pdf_input("a.pdf", 1));
    set.add(corrupt_input("b.png"));
    set.add(pdf_input("c.pdf", 2));

    // Drag "a" to the end.
    assert!(set.move_to(a, 2));

    let result = Merger::new(QualityTier::Low)
        .with_registry(set.registry().clone())
        .merge(&set.snapshot(), &mut NoProgress, &CancelFlag::new())
        .await
        .unwrap()
        .unwrap();

    let names: Vec<&str> = result.outcomes.iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["b.png", "c.pdf", "a.pdf"]);
    assert_eq!(result.outcomes[2].id(), a);
    assert_eq!(result.statistics.total_pages, 4);

    // Only the set's own handles remain after the run.
    assert_eq!(set.registry().live_handles(), 3);
}

#[tokio::test]
async fn test_removing_and_clearing_release_handles() {
    let mut set = WorkingSet::new();
    let registry = set.registry().clone();
    let a = set.add(pdf_input("a.pdf", 1));
    set.add(pdf_input("b.pdf", 1));
    assert_eq!(registry.live_handles(), 2);

    assert!(set.remove(a).is_some());
    assert_eq!(registry.live_handles(), 1);
    assert!(set.remove(a).is_none());

    set.clear();
    assert_eq!(registry.live_handles(), 0);
    assert!(set.is_empty());
}

#[tokio::test]
async fn test_dropping_set_releases_handles() {
    let set_registry = {
        let mut set = WorkingSet::new();
        set.extend([pdf_input("a.pdf", 1), png_input("b.png", 2, 2)]);
        set.registry().clone()
    };
    assert_eq!(set_registry.live_handles(), 0);
}

#[tokio::test]
async fn test_cancelling_mid_run_releases_handles() {
    let mut set = WorkingSet::new();
    set.extend((0..5).map(|i| pdf_input(&format!("{i}.pdf"), 1)));
    let merger = Merger::new(QualityTier::Low).with_registry(set.registry().clone());

    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let mut reports = Vec::new();
    let mut sink = |p: u8| {
        reports.push(p);
        if reports.len() == 2 {
            trigger.cancel();
        }
    };

    let outcome = merger.merge(&set.snapshot(), &mut sink, &cancel).await;
    assert!(matches!(outcome, Err(StitchError::Cancelled)));
    assert_eq!(reports, vec![20, 40]);
    assert_eq!(set.registry().live_handles(), 5);

    set.clear();
    assert_eq!(set.registry().live_handles(), 0);
}
