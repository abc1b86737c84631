//! Limit/offset clamping

/// Largest page a listing returns
pub const MAX_LIMIT: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Clamp a requested window
    ///
    /// An absent limit means [`MAX_LIMIT`]; a negative limit yields an
    /// empty page. Offsets below zero are floored to zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(MAX_LIMIT).clamp(0, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
