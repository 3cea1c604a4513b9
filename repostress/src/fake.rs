//! A fault-injecting endpoint simulator.
//!
//! Stands in for a real repository when exercising the pool without network
//! access. Every call sleeps for a randomized duration and then fails with
//! fixed probabilities: 5% transport failure, 15% HTTP 500, 80% success.

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use reqwest::Response;

use crate::endpoint::Endpoint;

/// A simulated endpoint with randomized latency and failures.
#[derive(Debug, Default)]
pub struct FlakyEndpoint;

fn respond(status: u16) -> Response {
    http::Response::builder()
        .status(status)
        .body("")
        .unwrap()
        .into()
}

#[async_trait]
impl Endpoint for FlakyEndpoint {
    async fn upload(&self, _path: &str, content: Bytes) -> anyhow::Result<Response> {
        let roll = rand::rng().random_range(0..20u64);
        tokio::time::sleep(Duration::from_millis(roll * 100)).await;
        drop(content);

        match roll {
            0 => Err(anyhow!("simulated transport failure")),
            1..4 => Ok(respond(500)),
            _ => Ok(respond(200)),
        }
    }

    async fn download(&self, _path: &str) -> anyhow::Result<Response> {
        let roll = rand::rng().random_range(0..1000u64);
        tokio::time::sleep(Duration::from_millis(roll)).await;

        match roll {
            0..50 => Err(anyhow!("simulated transport failure")),
            50..200 => Ok(respond(500)),
            _ => Ok(respond(200)),
        }
    }
}
