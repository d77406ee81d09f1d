//! Recoverable coding-error channel.
//!
//! Programmer misuse that has a safe fallback (resampling values of
//! mismatched type, an empty sample list) does not return an `Err`: the
//! operation posts a coding error here and returns a default. Callers that
//! care take an [`ErrorMark`] before the operation and inspect it after.
//!
//! Errors are kept per thread and are also logged with `tracing::error!`.

use std::cell::RefCell;
use std::fmt;

/// One posted coding error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodingError {
    /// Module that posted the error.
    pub source: &'static str,
    pub message: String,
}

impl fmt::Display for CodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coding error in {}: {}", self.source, self.message)
    }
}

thread_local! {
    static CODING_ERRORS: RefCell<Vec<CodingError>> = const { RefCell::new(Vec::new()) };
}

/// Post a coding error on the current thread.
pub fn post_coding_error(source: &'static str, message: impl Into<String>) {
    let message = message.into();
    tracing::error!(target: "hydra_scene::diagnostic", source, "{}", message);
    CODING_ERRORS.with(|errors| {
        errors.borrow_mut().push(CodingError { source, message });
    });
}

/// Post a coding error with `format!` arguments.
#[macro_export]
macro_rules! coding_error {
    ($($arg:tt)*) => {
        $crate::util::diagnostic::post_coding_error(module_path!(), format!($($arg)*))
    };
}

/// Marks a point in the coding-error stream of the current thread.
///
/// Errors posted after the mark was taken are visible through it.
#[derive(Debug)]
pub struct ErrorMark {
    start: usize,
}

impl ErrorMark {
    /// Take a mark at the current end of the error stream.
    pub fn new() -> Self {
        Self {
            start: CODING_ERRORS.with(|errors| errors.borrow().len()),
        }
    }

    /// Move the mark to the current end of the stream.
    pub fn set_mark(&mut self) {
        self.start = CODING_ERRORS.with(|errors| errors.borrow().len());
    }

    /// Check that nothing was posted since the mark.
    pub fn is_clean(&self) -> bool {
        CODING_ERRORS.with(|errors| errors.borrow().len() <= self.start)
    }

    /// Errors posted since the mark.
    pub fn errors(&self) -> Vec<CodingError> {
        CODING_ERRORS.with(|errors| {
            errors
                .borrow()
                .iter()
                .skip(self.start)
                .cloned()
                .collect()
        })
    }

    /// Discard errors posted since the mark.
    ///
    /// Returns true if anything was discarded.
    pub fn clear(&self) -> bool {
        CODING_ERRORS.with(|errors| {
            let mut errors = errors.borrow_mut();
            let had = errors.len() > self.start;
            errors.truncate(self.start);
            had
        })
    }
}

impl Default for ErrorMark {
    fn default() -> Self {
        Self::new()
    }
}
