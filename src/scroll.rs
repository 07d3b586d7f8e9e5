//! Scroll proximity check for infinite result lists.

/// Scroll state of a result list, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top
    pub offset: f64,
    /// Height of the visible area
    pub viewport: f64,
    /// Height of the whole list
    pub content: f64,
}

impl ScrollPosition {
    pub fn new(offset: f64, viewport: f64, content: f64) -> Self {
        Self {
            offset,
            viewport,
            content,
        }
    }

    /// Pixels left below the visible area
    pub fn remaining(&self) -> f64 {
        (self.content - self.offset - self.viewport).max(0.0)
    }

    pub fn near_end(&self, threshold: f64) -> bool {
        self.remaining() <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_end_within_threshold() {
        let position = ScrollPosition::new(1500.0, 600.0, 2400.0);
        assert_eq!(position.remaining(), 300.0);
        assert!(position.near_end(400.0));
        assert!(!position.near_end(200.0));
    }

    #[test]
    fn short_lists_are_always_near_end() {
        let position = ScrollPosition::new(0.0, 900.0, 500.0);
        assert_eq!(position.remaining(), 0.0);
        assert!(position.near_end(0.0));
    }
}
