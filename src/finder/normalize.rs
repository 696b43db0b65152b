use crate::document::{Candidate, DocumentBackend, RangeRef};
use crate::selection::PositionedRange;
use std::sync::Arc;

/// Ranges that survived normalization and a message per dropped candidate.
#[derive(Debug, Default)]
pub struct Normalized {
    pub ranges: Vec<PositionedRange>,
    pub warnings: Vec<String>,
}

/// Turn candidates into positioned ranges.
///
/// A candidate's own range is used when it is still live, then its
/// range-valued attribute, and finally a range materialized from its bounds.
/// Candidates that cannot be positioned are dropped with a warning.
pub fn normalize(backend: &dyn DocumentBackend, candidates: Vec<Candidate>) -> Normalized {
    let document: Arc<str> = Arc::from(backend.document_id());
    let mut out = Normalized::default();

    for candidate in candidates {
        match position(backend, &candidate) {
            Ok(range) => out.ranges.push(PositionedRange {
                kind: candidate.kind,
                text: range.text,
                start: range.start,
                end: range.end,
                document: Arc::clone(&document),
            }),
            Err(reason) => {
                tracing::warn!(
                    kind = %candidate.kind,
                    start = candidate.start,
                    end = candidate.end,
                    "dropping candidate: {reason}"
                );
                out.warnings.push(format!(
                    "{} at [{}, {}): {reason}",
                    candidate.kind, candidate.start, candidate.end
                ));
            }
        }
    }

    out
}

fn position(backend: &dyn DocumentBackend, candidate: &Candidate) -> Result<RangeRef, String> {
    let live = |range: &Option<RangeRef>| range.as_ref().filter(|r| backend.is_live(r)).cloned();

    if let Some(range) = live(&candidate.native) {
        return Ok(range);
    }
    if let Some(range) = live(&candidate.range) {
        return Ok(range);
    }
    if candidate.start == candidate.end {
        return Err("no live range and an empty span".to_string());
    }
    backend
        .materialize(candidate.start, candidate.end)
        .map_err(|e| e.to_string())
}
