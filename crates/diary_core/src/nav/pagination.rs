//! Windowed pagination with a single probe row.
//!
//! A page `[start, end)` is fetched as `end - start + 1` rows. If the extra
//! probe row comes back, there is a next page; the probe is dropped from the
//! returned items.

use std::convert::Infallible;
use thiserror::Error;

/// Rejected pagination bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid page range: start={start}, end={end} (need 0 <= start < end)")]
pub struct InvalidRange {
    pub start: i64,
    pub end: i64,
}

/// Failure of [`page`]: bad bounds, or the source itself failed.
#[derive(Debug, Error)]
pub enum PageError<E> {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
    #[error("ordered source failed: {0}")]
    Source(#[source] E),
}

/// Validated half-open window `[start, end)` over an ordered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u64,
    end: u64,
}

impl PageRange {
    /// Validates `0 <= start < end`.
    pub fn new(start: i64, end: i64) -> Result<Self, InvalidRange> {
        match (u64::try_from(start), u64::try_from(end)) {
            (Ok(lower), Ok(upper)) if lower < upper => Ok(Self {
                start: lower,
                end: upper,
            }),
            _ => Err(InvalidRange { start, end }),
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }
}

/// One page of items plus boundary flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow<T> {
    pub items: Vec<T>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> PageWindow<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageWindow<U> {
        PageWindow {
            items: self.items.into_iter().map(f).collect(),
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }
}

/// A sorted, possibly unbounded sequence that can be read by offset.
pub trait OrderedSource {
    type Item;
    type Error;

    /// Returns at most `limit` items starting at position `offset`.
    fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<Self::Item>, Self::Error>;
}

impl<T: Clone> OrderedSource for [T] {
    type Item = T;
    type Error = Infallible;

    fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<T>, Infallible> {
        let from = usize::try_from(offset).unwrap_or(usize::MAX).min(self.len());
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self[from..].iter().take(take).cloned().collect())
    }
}

/// Fetches the window `[start, end)` of `source`.
///
/// `has_prev` is `start != 0`; `has_next` is true iff more than
/// `end - start` items exist at or after `start`.
pub fn page<S>(source: &S, start: i64, end: i64) -> Result<PageWindow<S::Item>, PageError<S::Error>>
where
    S: OrderedSource + ?Sized,
{
    let range = PageRange::new(start, end)?;
    page_range(source, range).map_err(PageError::Source)
}

/// Same as [`page`] for an already validated range.
pub fn page_range<S>(source: &S, range: PageRange) -> Result<PageWindow<S::Item>, S::Error>
where
    S: OrderedSource + ?Sized,
{
    let size = range.size();
    let mut items = source.fetch(range.start(), size.saturating_add(1))?;
    let has_next = u64::try_from(items.len()).unwrap_or(u64::MAX) > size;
    items.truncate(usize::try_from(size).unwrap_or(usize::MAX));

    Ok(PageWindow {
        items,
        has_prev: range.start() != 0,
        has_next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        items: Vec<u32>,
        calls: Cell<u32>,
        last_limit: Cell<u64>,
    }

    impl OrderedSource for CountingSource {
        type Item = u32;
        type Error = Infallible;

        fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<u32>, Infallible> {
            self.calls.set(self.calls.get() + 1);
            self.last_limit.set(limit);
            self.items.as_slice().fetch(offset, limit)
        }
    }

    #[test]
    fn middle_window_has_both_flags() {
        let times = [5, 4, 3, 2, 1];
        let window = page(&times[..], 1, 3).unwrap();
        assert_eq!(window.items, vec![4, 3]);
        assert!(window.has_prev);
        assert!(window.has_next);
    }

    #[test]
    fn window_covering_everything_has_no_flags() {
        let items = ["a", "b"];
        let window = page(&items[..], 0, 10).unwrap();
        assert_eq!(window.items, vec!["a", "b"]);
        assert!(!window.has_prev);
        assert!(!window.has_next);
    }

    #[test]
    fn exact_fit_last_page_has_no_next() {
        let items = [1, 2, 3, 4];
        let window = page(&items[..], 2, 4).unwrap();
        assert_eq!(window.items, vec![3, 4]);
        assert!(window.has_prev);
        assert!(!window.has_next);
    }

    #[test]
    fn start_past_end_returns_empty_page() {
        let items = [1, 2, 3];
        let window = page(&items[..], 7, 9).unwrap();
        assert!(window.items.is_empty());
        assert!(window.has_prev);
        assert!(!window.has_next);
    }

    #[test]
    fn invalid_ranges_are_rejected_before_fetching() {
        let source = CountingSource {
            items: vec![1, 2, 3],
            calls: Cell::new(0),
            last_limit: Cell::new(0),
        };
        for (start, end) in [(3, 3), (4, 2), (-1, 2), (-5, -1)] {
            let err = page(&source, start, end).unwrap_err();
            assert!(matches!(
                err,
                PageError::InvalidRange(InvalidRange { start: s, end: e }) if s == start && e == end
            ));
        }
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn fetch_requests_exactly_one_probe_row() {
        let source = CountingSource {
            items: (0..100).collect(),
            calls: Cell::new(0),
            last_limit: Cell::new(0),
        };
        page(&source, 20, 30).unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(source.last_limit.get(), 11);
    }

    #[test]
    fn flags_hold_for_every_window_over_small_sources() {
        for len in 0..6usize {
            let items: Vec<usize> = (0..len).collect();
            for start in 0..8i64 {
                for end in (start + 1)..10 {
                    let window = page(items.as_slice(), start, end).unwrap();
                    let size = (end - start) as usize;
                    let remaining = len.saturating_sub(start as usize);
                    assert!(window.items.len() <= size);
                    assert_eq!(window.items.len(), remaining.min(size));
                    assert_eq!(window.has_next, remaining > size);
                    assert_eq!(window.has_prev, start != 0);
                }
            }
        }
    }
}
