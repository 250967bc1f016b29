use async_trait::async_trait;

/// Outbound path back to the chat platform.
///
/// Handlers never talk to the platform connection directly; they are
/// handed one of these through their command context.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Post `text` to `channel`.
    async fn send(&self, channel: &str, text: &str);
}
