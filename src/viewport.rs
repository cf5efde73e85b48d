//! Bounded windows over rendered lines.
//!
//! A document is a flat list of lines whose first `sticky` lines form a header
//! that never scrolls. Everything here is total: any offset, height or sticky
//! count produces a valid (possibly empty) result.

/// Return the sticky header followed by the visible slice of the remainder.
///
/// The result never holds more than `height` lines. When the header alone is
/// taller than the viewport only its first `height` lines are kept.
pub fn viewport<T: Clone>(lines: &[T], scroll: usize, height: usize, sticky: usize) -> Vec<T> {
    let sticky = sticky.min(lines.len()).min(height);
    let (header, body) = lines.split_at(sticky);

    let from = scroll.min(body.len());
    let to = scroll
        .saturating_add(height - sticky)
        .min(body.len())
        .max(from);

    header.iter().chain(&body[from..to]).cloned().collect()
}

/// Largest scroll offset that still fills the viewport.
pub fn max_scroll(content: usize, height: usize, sticky: usize) -> usize {
    let body = content.saturating_sub(sticky);
    let visible = height.saturating_sub(sticky);
    body.saturating_sub(visible)
}
