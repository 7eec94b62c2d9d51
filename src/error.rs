//! Error types and result alias for widget construction.
//!
//! Only configuration problems and a failed first render surface as errors.
//! Repaint failures after construction are logged and dropped, since a
//! progress line is a visual aid and must never abort the batch it decorates.

use thiserror::Error;

/// Errors raised while constructing a widget.
#[derive(Error, Debug)]
pub enum Error {
    /// The repaint interval was zero.
    #[error("update interval must be positive, got {interval}")]
    InvalidInterval {
        /// The rejected interval.
        interval: u64,
    },

    /// The bar width was zero.
    #[error("bar width must be positive, got {width}")]
    InvalidWidth {
        /// The rejected width.
        width: usize,
    },

    /// A frame set with no frames was supplied.
    #[error("frame set for '{tag}' has no frames")]
    EmptyFrames {
        /// Tag of the widget being built.
        tag: String,
    },

    /// A spinner was built outside of a tokio runtime.
    #[error("spinner '{tag}' needs a running tokio runtime to drive its timer")]
    NoRuntime {
        /// Tag of the spinner being built.
        tag: String,
    },

    /// The render surface refused the initial line.
    #[error("failed to create status line: {source}")]
    Render {
        /// Underlying I/O failure.
        #[from]
        source: std::io::Error,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidInterval { interval: 0 };
        assert_eq!(err.to_string(), "update interval must be positive, got 0");

        let err = Error::EmptyFrames {
            tag: "[scan]".to_string(),
        };
        assert!(err.to_string().contains("[scan]"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::Render { .. }));
        assert!(err.to_string().contains("closed"));
    }
}
