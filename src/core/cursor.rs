//! Result cursor: which timetable of the displayed set is active

/// Active position within a result set of known length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultCursor {
    index: Option<usize>,
    len: usize,
}

impl ResultCursor {
    /// Cursor at the first result, or absent when `len` is zero
    #[must_use]
    pub const fn at_start(len: usize) -> Self {
        Self {
            index: if len == 0 { None } else { Some(0) },
            len,
        }
    }

    /// Active index, absent for an empty set
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Length of the set the cursor points into
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the underlying set is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Re-clamp after the set changed length: `min(index, len - 1)`.
    /// An absent index comes back as 0 once the set is non-empty.
    #[must_use]
    pub fn reclamp(self, len: usize) -> Self {
        let index = match len {
            0 => None,
            _ => Some(self.index.unwrap_or(0).min(len - 1)),
        };
        Self { index, len }
    }

    /// Step forward; no-op on the last result
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn next(self) -> Self {
        match self.index {
            Some(i) if i + 1 < self.len => Self {
                index: Some(i + 1),
                ..self
            },
            _ => self,
        }
    }

    /// Step back; no-op on the first result
    #[must_use]
    pub fn previous(self) -> Self {
        match self.index {
            Some(i) if i > 0 => Self {
                index: Some(i - 1),
                ..self
            },
            _ => self,
        }
    }
}
