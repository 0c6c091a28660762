//! Heuristic estimate of AI-authored lines per file.

use crate::domain::{CoverageClass, CoverageEntry, EntryCoverage};

/// Per-entry allowance added for each wholly AI-authored definition when
/// explicit line ranges are also declared.
pub const WHOLE_ENTRY_ALLOWANCE: usize = 20;

/// How a header without a `TYPE:` declaration is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Estimate as if the file declared less than half.
    #[default]
    AssumeBelowHalf,
    /// Estimate zero AI-authored lines.
    Zero,
}

/// Estimate the AI-authored line count of a file.
///
/// The result is always within `0..=total_lines`.
pub fn estimate_ai_lines(
    total_lines: usize,
    class: CoverageClass,
    entries: &[CoverageEntry],
    policy: UnknownPolicy,
) -> usize {
    let base = match (class, policy) {
        (CoverageClass::Whole, _) => total_lines,
        (CoverageClass::AboveHalf, _) => total_lines * 75 / 100,
        (CoverageClass::BelowHalf, _)
        | (CoverageClass::Unknown, UnknownPolicy::AssumeBelowHalf) => total_lines * 25 / 100,
        (CoverageClass::Unknown, UnknownPolicy::Zero) => return 0,
    };

    let partial_sum = entries
        .iter()
        .filter_map(CoverageEntry::span)
        .fold(0usize, usize::saturating_add);
    let whole_entries = entries
        .iter()
        .filter(|entry| entry.coverage == EntryCoverage::Whole)
        .count();

    let estimate = if partial_sum > 0 {
        partial_sum.saturating_add(whole_entries.saturating_mul(WHOLE_ENTRY_ALLOWANCE))
    } else {
        base
    };
    estimate.min(total_lines)
}
