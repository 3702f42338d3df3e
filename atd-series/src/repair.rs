//! Outlier removal and forward filling of per-category bucket values.

use crate::model::CATEGORY_COUNT;

/// Per-category values of one bucket; `None` marks a bucket without rows.
pub type CategoryRow = [Option<u32>; CATEGORY_COUNT];

/// Treat values above `threshold` as missing, then forward-fill every
/// column in order. Missing values with nothing before them become 0.
///
/// Rows must already be in chronological order.
pub fn repair(rows: &[CategoryRow], threshold: u32) -> Vec<[u32; CATEGORY_COUNT]> {
    let mut last_valid: [Option<u32>; CATEGORY_COUNT] = [None; CATEGORY_COUNT];
    let mut outliers = 0usize;

    let repaired = rows
        .iter()
        .map(|row| {
            let mut out = [0u32; CATEGORY_COUNT];
            for (col, value) in row.iter().enumerate() {
                let valid = match value {
                    Some(v) if *v > threshold => {
                        outliers += 1;
                        None
                    }
                    other => *other,
                };
                if valid.is_some() {
                    last_valid[col] = valid;
                }
                out[col] = last_valid[col].unwrap_or(0);
            }
            out
        })
        .collect();

    if outliers > 0 {
        log::debug!(
            "[ATD] repair: {} category values above {} treated as missing",
            outliers,
            threshold
        );
    }
    repaired
}
