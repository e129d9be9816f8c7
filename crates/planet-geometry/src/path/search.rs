//! Offset lookup over sorted, adjacent half-open spans.

use std::cmp::Ordering;

/// Something covering the arc-length interval `[offset, end)`.
pub trait Span {
    fn offset(&self) -> f32;
    fn end(&self) -> f32;

    /// Whether `offset` falls inside the span.
    fn contains(&self, offset: f32) -> bool {
        self.offset() <= offset && offset < self.end()
    }
}

/// Index of the span containing `offset`.
///
/// `spans` must be sorted by offset without overlaps. A miss is logged and
/// returns `None`.
pub fn search<T: Span>(spans: &[T], offset: f32) -> Option<usize> {
    if !offset.is_finite() {
        tracing::error!(offset, "Failed to search span array, offset is not finite");
        return None;
    }

    let found = spans.binary_search_by(|span| {
        if span.end() <= offset {
            Ordering::Less
        } else if span.offset() > offset {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });

    if let Ok(index) = found {
        Some(index)
    } else {
        tracing::error!(
            len = spans.len(),
            offset,
            "Failed to search span array, nothing found"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Interval(f32, f32);

    impl Span for Interval {
        fn offset(&self) -> f32 {
            self.0
        }

        fn end(&self) -> f32 {
            self.1
        }
    }

    fn spans() -> Vec<Interval> {
        vec![Interval(0.0, 1.0), Interval(1.0, 2.5), Interval(2.5, 3.0)]
    }

    #[test]
    fn finds_containing_span() {
        let spans = spans();
        assert_eq!(search(&spans, 0.0), Some(0));
        assert_eq!(search(&spans, 0.99), Some(0));
        assert_eq!(search(&spans, 2.0), Some(1));
        assert_eq!(search(&spans, 2.999), Some(2));
    }

    #[test]
    fn boundaries_belong_to_the_later_span() {
        let spans = spans();
        assert_eq!(search(&spans, 1.0), Some(1));
        assert_eq!(search(&spans, 2.5), Some(2));
    }

    #[test]
    fn misses_return_none() {
        let spans = spans();
        assert_eq!(search(&spans, -0.1), None);
        assert_eq!(search(&spans, 3.0), None);
        assert_eq!(search(&spans, f32::NAN), None);
        assert_eq!(search::<Interval>(&[], 0.0), None);
    }
}
