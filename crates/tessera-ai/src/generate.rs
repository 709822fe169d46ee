//! Tile generation with bounded retries.
//!
//! The generator is an external collaborator; callers must never hang
//! on it. [`generate_with_fallback`] retries a fixed number of attempts
//! with increasing backoff and always returns a result — generated
//! content, or a clearly marked fallback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Output of a generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTile {
    pub content: String,
    /// LLM tokens consumed — charged against the subject's
    /// `tokens_used` quota after the call succeeds.
    pub tokens_used: u64,
    /// True when generation failed and `content` is the fallback
    /// message rather than a real insight.
    pub fallback: bool,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation provider error: {0}")]
    Provider(String),

    #[error("generation timed out")]
    Timeout,
}

/// An external tile generator.
pub trait TileGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<GeneratedTile, GenerateError>> + Send;
}

/// Retry policy for generation calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first try).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled (up to `max_delay`)
    /// after each failure.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy suitable for unit tests (no real waiting).
    pub fn instant() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            multiplier: 2.0,
        }
    }
}

/// Fallback content returned when every attempt failed.
const FALLBACK_CONTENT: &str =
    "Tile generation is temporarily unavailable. Please try regenerating this tile.";

/// Call the generator with bounded retries and exponential backoff.
///
/// Always returns a [`GeneratedTile`]: the generated content on the
/// first success, or a fallback marked with `fallback = true` (and zero
/// token usage) once all attempts are exhausted.
pub async fn generate_with_fallback<G: TileGenerator>(
    generator: &G,
    prompt: &str,
    policy: &RetryPolicy,
) -> GeneratedTile {
    let mut delay = policy.initial_delay;

    for attempt in 1..=policy.max_attempts.max(1) {
        match generator.generate(prompt).await {
            Ok(tile) => {
                if attempt > 1 {
                    debug!(attempt, "generation succeeded after retry");
                }
                return tile;
            }
            Err(e) if attempt < policy.max_attempts => {
                warn!(
                    attempt,
                    max = policy.max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %e,
                    "generation attempt failed — retrying"
                );
                tokio::time::sleep(delay).await;
                let next_ms = (delay.as_millis() as f64 * policy.multiplier) as u128;
                delay = Duration::from_millis(next_ms.min(policy.max_delay.as_millis()) as u64);
            }
            Err(e) => {
                warn!(
                    attempt,
                    max = policy.max_attempts,
                    error = %e,
                    "generation attempts exhausted — returning fallback"
                );
            }
        }
    }

    GeneratedTile {
        content: FALLBACK_CONTENT.into(),
        tokens_used: 0,
        fallback: true,
    }
}
