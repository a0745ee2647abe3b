//! Index-build progress reporting
//!
//! With the `progress` feature the bar is indicatif's; without it a silent
//! stand-in with the same calls is compiled instead, so the builder never
//! has to know which one it drives.

#[cfg(feature = "progress")]
pub use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progress"))]
pub use self::silent::{ProgressBar, ProgressStyle};

const SLOT_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} slots ({percent}%) {msg}";

/// Bar counting settled index slots out of `len`
pub fn slot_bar(len: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(SLOT_TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(message);
    bar
}

#[cfg(not(feature = "progress"))]
mod silent {
    use std::borrow::Cow;
    use std::convert::Infallible;

    /// Accepts every update and draws nothing
    #[derive(Debug, Clone, Default)]
    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new(_len: u64) -> Self {
            Self
        }

        pub fn hidden() -> Self {
            Self
        }

        pub fn set_style(&self, _style: ProgressStyle) {}

        pub fn set_message(&self, _message: impl Into<Cow<'static, str>>) {}

        pub fn inc(&self, _delta: u64) {}

        pub fn finish_and_clear(&self) {}
    }

    #[derive(Debug, Clone, Default)]
    pub struct ProgressStyle;

    impl ProgressStyle {
        pub fn default_bar() -> Self {
            Self
        }

        pub fn template(self, _template: &str) -> Result<Self, Infallible> {
            Ok(self)
        }

        pub fn progress_chars(self, _chars: &str) -> Self {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_bar_counts_slots() {
        let bar = slot_bar(10, "sorting");
        bar.inc(4);
        bar.inc(6);
        #[cfg(feature = "progress")]
        assert_eq!(bar.position(), 10);
        bar.finish_and_clear();
    }
}
