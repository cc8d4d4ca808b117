use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn copy(&self, text: &str) -> Result<()>;
}
