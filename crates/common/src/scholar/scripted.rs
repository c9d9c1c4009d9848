//! Scripted metadata source for testing

use super::{Lookup, MetadataSource};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(Lookup),
    Fail(String),
}

/// Replays queued responses per identifier.
///
/// The last queued response for an identifier repeats forever; identifiers
/// without a script answer 404.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `identifier`
    pub fn respond(self, identifier: &str, lookup: Lookup) -> Self {
        self.push(identifier, Scripted::Respond(lookup));
        self
    }

    /// Queue a transport failure for `identifier`
    pub fn fail(self, identifier: &str, message: &str) -> Self {
        self.push(identifier, Scripted::Fail(message.to_string()));
        self
    }

    /// Number of requests issued for `identifier`
    pub fn calls(&self, identifier: &str) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.get(identifier).copied().unwrap_or(0)
    }

    /// Number of requests issued overall
    pub fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.values().sum()
    }

    fn push(&self, identifier: &str, scripted: Scripted) {
        let mut scripts = self.scripts.lock().unwrap_or_else(|e| e.into_inner());
        scripts.entry(identifier.to_string()).or_default().push_back(scripted);
    }

    fn next(&self, identifier: &str) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().unwrap_or_else(|e| e.into_inner());
        let queue = scripts.get_mut(identifier)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn lookup(&self, identifier: &str) -> Result<Lookup> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            *calls.entry(identifier.to_string()).or_default() += 1;
        }

        match self.next(identifier) {
            Some(Scripted::Respond(lookup)) => Ok(lookup),
            Some(Scripted::Fail(message)) => Err(AppError::Internal { message }),
            None => Ok(Lookup::Missing { status: 404 }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_response_repeats() {
        let source = ScriptedSource::new()
            .respond("a", Lookup::RateLimited)
            .respond("a", Lookup::Missing { status: 500 });

        assert_eq!(source.lookup("a").await.unwrap(), Lookup::RateLimited);
        assert_eq!(source.lookup("a").await.unwrap(), Lookup::Missing { status: 500 });
        assert_eq!(source.lookup("a").await.unwrap(), Lookup::Missing { status: 500 });
        assert_eq!(source.calls("a"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_is_not_found() {
        let source = ScriptedSource::new();
        let lookup = tokio_test::assert_ok!(source.lookup("missing").await);
        assert_eq!(lookup, Lookup::Missing { status: 404 });
        assert_eq!(source.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure() {
        let source = ScriptedSource::new().fail("a", "boom");
        tokio_test::assert_err!(source.lookup("a").await);
    }
}
