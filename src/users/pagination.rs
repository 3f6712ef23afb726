//! Id-window pagination.
//!
//! `/api/users/{limit}/{offset}` selects users whose id falls in a window of
//! `limit` consecutive ids. A positive offset starts the window at
//! `offset + 1`; a zero offset starts it at `0`. Gaps in the id sequence
//! (blocked users stay, but a failed insert burns an id) shrink the page.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Limit cannot be less than or equal to zero!")]
    InvalidLimit,
    #[error("Offset cannot be less than zero!")]
    InvalidOffset,
}

/// Inclusive range of user ids `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWindow {
    first: i64,
    last: i64,
}

impl IdWindow {
    /// Build the window for a `limit`/`offset` pair.
    ///
    /// # Errors
    /// Returns [`PageError`] for a non-positive limit or a negative offset.
    pub fn new(limit: i64, offset: i64) -> Result<Self, PageError> {
        if limit <= 0 {
            return Err(PageError::InvalidLimit);
        }
        if offset < 0 {
            return Err(PageError::InvalidOffset);
        }

        let first = if offset > 0 {
            offset.saturating_add(1)
        } else {
            0
        };
        let last = first.saturating_add(limit - 1);

        Ok(Self { first, last })
    }

    #[must_use]
    pub const fn first(&self) -> i64 {
        self.first
    }

    #[must_use]
    pub const fn last(&self) -> i64 {
        self.last
    }

    #[must_use]
    pub fn contains(&self, id: i32) -> bool {
        (self.first..=self.last).contains(&i64::from(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_limit() {
        assert_eq!(IdWindow::new(0, 1), Err(PageError::InvalidLimit));
        assert_eq!(IdWindow::new(-2, 4), Err(PageError::InvalidLimit));
        assert_eq!(IdWindow::new(-100, -8), Err(PageError::InvalidLimit));
    }

    #[test]
    fn rejects_negative_offset() {
        assert_eq!(IdWindow::new(2, -3), Err(PageError::InvalidOffset));
    }

    #[test]
    fn zero_offset_starts_at_zero() -> Result<(), PageError> {
        let window = IdWindow::new(3, 0)?;
        assert_eq!((window.first(), window.last()), (0, 2));
        assert!(window.contains(1));
        assert!(window.contains(2));
        assert!(!window.contains(3));
        Ok(())
    }

    #[test]
    fn positive_offset_skips_one_id() -> Result<(), PageError> {
        let window = IdWindow::new(1, 1)?;
        assert_eq!((window.first(), window.last()), (2, 2));

        let window = IdWindow::new(3, 2)?;
        assert_eq!((window.first(), window.last()), (3, 5));
        Ok(())
    }

    #[test]
    fn huge_values_saturate() -> Result<(), PageError> {
        let window = IdWindow::new(i64::MAX, i64::MAX)?;
        assert_eq!(window.first(), i64::MAX);
        assert_eq!(window.last(), i64::MAX);
        assert!(!window.contains(i32::MAX));
        Ok(())
    }
}
