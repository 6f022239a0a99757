//! Shared test doubles for dispatcher integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use nagloop_core::dispatch::{PollOutcome, Producer};
use nagloop_core::models::{Notice, PostRequest};
use nagloop_core::sinks::{ChatSink, SinkError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub type Log<T> = Arc<Mutex<Vec<T>>>;

pub fn log<T>() -> Log<T> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn rooms(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// One post as seen by the sink.
#[derive(Debug, Clone)]
pub struct Post {
    pub room: String,
    pub text: String,
    pub at: Instant,
}

/// Sink that records every attempt, optionally failing or stalling per room.
#[derive(Default)]
pub struct RecordingSink {
    pub failing: Vec<String>,
    pub latency: HashMap<String, Duration>,
    pub posts: Log<Post>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            posts: log(),
            ..Default::default()
        }
    }

    pub fn failing(mut self, room: &str) -> Self {
        self.failing.push(room.to_string());
        self
    }

    pub fn slow(mut self, room: &str, latency: Duration) -> Self {
        self.latency.insert(room.to_string(), latency);
        self
    }

    pub async fn rooms_attempted(&self) -> Vec<String> {
        self.posts.lock().await.iter().map(|p| p.room.clone()).collect()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn post(&self, request: &PostRequest) -> Result<(), SinkError> {
        if let Some(latency) = self.latency.get(&request.room_id) {
            tokio::time::sleep(*latency).await;
        }
        self.posts.lock().await.push(Post {
            room: request.room_id.clone(),
            text: request.message.clone(),
            at: Instant::now(),
        });
        if self.failing.contains(&request.room_id) {
            return Err(SinkError::Rejected(format!("{} unavailable", request.room_id)));
        }
        Ok(())
    }
}

/// Invocation window of one poll.
#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    pub started: Instant,
    pub finished: Instant,
}

/// Producer returning the same notices every poll and recording when it ran.
pub struct ScriptedProducer {
    pub name: String,
    pub notices: Vec<Notice>,
    pub delay: Duration,
    pub work: Duration,
    pub invocations: Log<Invocation>,
}

impl ScriptedProducer {
    pub fn new(name: &str, notices: Vec<Notice>, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            notices,
            delay,
            work: Duration::ZERO,
            invocations: log(),
        }
    }

    /// Time spent inside each poll before returning.
    pub fn working_for(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }
}

#[async_trait]
impl Producer for ScriptedProducer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self) -> anyhow::Result<PollOutcome> {
        let started = Instant::now();
        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        self.invocations.lock().await.push(Invocation {
            started,
            finished: Instant::now(),
        });
        Ok(PollOutcome::from_notices(self.notices.clone(), self.delay))
    }
}
