/// Classification for retry policy.
///
/// The quote client never retries. The sync engine reads this to decide
/// whether a failed symbol is worth another attempt.
///
/// | Class | Retry? |
/// |-------|--------|
/// | `Never` | No, the request is fundamentally invalid or the payload is broken |
/// | `WithBackoff` | Yes, after waiting (rate limit, timeout) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Bad symbol or malformed response. Retrying won't help.
    Never,

    /// Transient condition. Retry after a backoff delay.
    WithBackoff,
}
