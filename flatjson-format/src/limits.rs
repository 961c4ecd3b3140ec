//! Resource limits applied while building and opening indexes

/// Limits guarding against pathological input
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum container nesting depth accepted by the encoder and on open (default: 512)
    pub max_depth: usize,
    /// Maximum number of body lines accepted on open or produced by a build (default: 64 Mi)
    pub max_lines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_lines: 64 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Fail when `depth` exceeds [`Limits::max_depth`].
    pub fn check_depth(&self, depth: usize) -> crate::Result<()> {
        if depth > self.max_depth {
            return Err(crate::FlatError::LimitExceeded(format!(
                "nesting depth {} exceeds maximum {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }

    /// Fail when `lines` exceeds [`Limits::max_lines`].
    pub fn check_lines(&self, lines: usize) -> crate::Result<()> {
        if lines > self.max_lines {
            return Err(crate::FlatError::LimitExceeded(format!(
                "{} lines exceeds maximum {}",
                lines, self.max_lines
            )));
        }
        Ok(())
    }
}
