// Per-call timeouts for AWS requests
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    anyhow,
    Result,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Run `future`, failing with an error if it takes longer than `limit`.
pub async fn with_timeout<T, F>(limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, future).await {
        Ok(result) => result,
        Err(_)     => Err(anyhow!("timed out after {}s", limit.as_secs_f64())),
    }
}
