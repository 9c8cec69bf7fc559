//! Cursor reconciliation after the sentence list is rebuilt.

/// Map the cursor from the previous sentence list onto a new one.
///
/// - No sentences: the cursor goes dormant at 0.
/// - The old position still exists: keep it.
/// - Otherwise: clamp to the new last sentence.
///
/// `old_count` does not change the outcome; it is only recorded so the log
/// shows how the list changed.
pub fn reconcile(old_cursor: usize, old_count: usize, new_count: usize) -> usize {
    let cursor = if new_count == 0 {
        0
    } else if old_cursor < new_count {
        old_cursor
    } else {
        new_count - 1
    };

    tracing::debug!(
        old_cursor,
        old_count,
        new_count,
        cursor,
        "Cursor reconciled"
    );
    cursor
}
