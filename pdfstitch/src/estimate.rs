//! Rough output size estimate shown before a run starts.

use crate::quality::QualityTier;

/// Approximate megabytes contributed by one page at each tier.
pub fn per_page_mb(tier: QualityTier) -> f64 {
    match tier {
        QualityTier::Low => 0.15,
        QualityTier::Medium => 0.4,
        QualityTier::High => 1.2,
    }
}

/// Estimate the output size for `count` pages at `tier`.
///
/// This is a heuristic only; it does not look at the actual inputs.
///
/// # Examples
///
/// ```
/// use pdfstitch::estimate::estimate_output_size;
/// use pdfstitch::quality::QualityTier;
///
/// assert_eq!(estimate_output_size(0, QualityTier::High), "0 MB");
/// assert_eq!(estimate_output_size(2, QualityTier::Low), "307.2 KB");
/// assert_eq!(estimate_output_size(5, QualityTier::Medium), "2.0 MB");
/// ```
pub fn estimate_output_size(count: usize, tier: QualityTier) -> String {
    if count == 0 {
        return "0 MB".to_string();
    }

    let mb = count as f64 * per_page_mb(tier);
    if mb < 1.0 {
        format!("{:.1} KB", mb * 1024.0)
    } else {
        format!("{mb:.1} MB")
    }
}
