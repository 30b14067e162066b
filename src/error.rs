// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations return `error::Result<T>`.  Platform failures are
// surfaced once, at the call site that failed; nothing in this crate retries.

use thiserror::Error;

use crate::platform::Platform;

/// Every error this crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// A windowing API call reported a failure code.
    #[error(transparent)]
    PlatformCall(#[from] PlatformCallFailure),

    /// Creation parameters could not be read from their JSON form.
    #[error("invalid creation parameters: {0}")]
    Config(#[from] serde_json::Error),
}

/// A failed call into the windowing API.
///
/// Carries the name of the failing operation (`"RegisterClassEx"`,
/// `"CreateWindow"`, …), the platform error code, and the rendered message
/// produced by [`format`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformCallFailure {
    context: &'static str,
    code: u32,
    message: String,
}

impl PlatformCallFailure {
    /// Build a failure for `code`, asking `platform` for a description.
    pub fn new(platform: &dyn Platform, context: &'static str, code: u32) -> Self {
        let description = platform.describe_error(code);
        Self {
            context,
            code,
            message: format(context, code, description.as_deref()),
        }
    }

    /// Build a failure from the last error recorded on the calling thread.
    ///
    /// Call immediately after the failing operation; any later platform call
    /// may overwrite the recorded code.
    pub fn last_error(platform: &dyn Platform, context: &'static str) -> Self {
        Self::new(platform, context, platform.last_error())
    }

    /// Name of the operation that failed.
    pub fn context(&self) -> &'static str {
        self.context
    }

    /// Raw platform error code.
    pub fn code(&self) -> u32 {
        self.code
    }
}

/// Render `"<message>: error <code>[: <description>]"`.
///
/// A single trailing `"\r\n"` is removed from `description` first; system
/// message tables terminate every entry with one.
pub fn format(message: &str, code: u32, description: Option<&str>) -> String {
    match description {
        Some(text) => {
            let text = text.strip_suffix("\r\n").unwrap_or(text);
            format!("{message}: error {code}: {text}")
        }
        None => format!("{message}: error {code}"),
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::Headless;

    #[test]
    fn format_without_description() {
        assert_eq!(format("CreateWindow", 5, None), "CreateWindow: error 5");
    }

    #[test]
    fn format_strips_one_trailing_line_break() {
        assert_eq!(
            format("RegisterClassEx", 87, Some("The parameter is incorrect.\r\n")),
            "RegisterClassEx: error 87: The parameter is incorrect."
        );
        assert_eq!(
            format("RegisterClassEx", 87, Some("Two breaks.\r\n\r\n")),
            "RegisterClassEx: error 87: Two breaks.\r\n"
        );
    }

    #[test]
    fn failure_uses_platform_description() {
        let platform = Headless::new();
        platform.describe_error_as(8, "Not enough memory resources are available.\r\n");

        let failure = PlatformCallFailure::new(&platform, "CreateWindow", 8);
        assert_eq!(failure.context(), "CreateWindow");
        assert_eq!(failure.code(), 8);
        assert_eq!(
            failure.to_string(),
            "CreateWindow: error 8: Not enough memory resources are available."
        );
    }

    #[test]
    fn last_error_reads_platform_state() {
        let platform = Headless::new();
        platform.set_last_error(1400);

        let failure = PlatformCallFailure::last_error(&platform, "GetMessage");
        assert_eq!(failure.code(), 1400);
        assert_eq!(failure.to_string(), "GetMessage: error 1400");
    }
}
