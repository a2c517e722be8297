pub mod datasets;
pub mod serp;
pub mod unlocker;

use crate::error::SdkError;

/// Fold per-item outcomes of a fan-out into per-item results.
///
/// Auth errors abort the whole batch; other errors become a failed item via
/// `on_error(index, error)`.
pub(crate) fn settle_batch<T>(
    outcomes: Vec<Result<T, SdkError>>,
    mut on_error: impl FnMut(usize, SdkError) -> T,
) -> Result<Vec<T>, SdkError> {
    let mut settled = Vec::with_capacity(outcomes.len());
    for (idx, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(item) => settled.push(item),
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => settled.push(on_error(idx, e)),
        }
    }
    Ok(settled)
}
