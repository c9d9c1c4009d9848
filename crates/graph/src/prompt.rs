//! Interactive rate-limit prompt

use async_trait::async_trait;
use citeforge_common::config::RateLimitMode;
use citeforge_common::{RateLimitDecider, RateLimitDecision};
use dialoguer::Select;
use tracing::warn;

/// Asks on the terminal whether to keep waiting or stop the run
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDecider;

#[async_trait]
impl RateLimitDecider for ConsoleDecider {
    async fn decide(&self, identifier: &str) -> RateLimitDecision {
        let prompt = format!(
            "Access to the metadata service was denied for {} (rate limited). Wait and retry, or exit?",
            identifier
        );

        let choice = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(prompt)
                .items(&["Wait", "Exit"])
                .default(0)
                .interact()
        })
        .await;

        match choice {
            Ok(Ok(1)) => RateLimitDecision::Abort,
            Ok(Ok(_)) => RateLimitDecision::Wait,
            Ok(Err(e)) => {
                warn!(error = %e, "Prompt unavailable, continuing to wait");
                RateLimitDecision::Wait
            }
            Err(e) => {
                warn!(error = %e, "Prompt task failed, continuing to wait");
                RateLimitDecision::Wait
            }
        }
    }
}

/// Pick the decider for the configured mode
pub fn decider_for(mode: RateLimitMode) -> Box<dyn RateLimitDecider> {
    match mode {
        RateLimitMode::Ask => Box::new(ConsoleDecider),
        RateLimitMode::Wait => Box::new(RateLimitDecision::Wait),
        RateLimitMode::Abort => Box::new(RateLimitDecision::Abort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_modes() {
        assert_eq!(decider_for(RateLimitMode::Wait).decide("10.1/a").await, RateLimitDecision::Wait);
        assert_eq!(decider_for(RateLimitMode::Abort).decide("10.1/a").await, RateLimitDecision::Abort);
    }
}
