//! One clock source feeding two displays.

use std::time::Duration;
use tokio::time::Instant;
use trickle::flow::prelude::*;
use trickle::flow::{Dedup, Poll, consumer, gather, pipe};

/// Seconds since boot, as a real time clock would
/// tell them, until the demo has run long enough.
fn rtc(boot: Instant, until: u64) -> impl FnMut() -> Option<u64> {
    move || {
        let seconds = boot.elapsed().as_secs();
        (seconds <= until).then_some(seconds)
    }
}

#[trickle::main]
async fn main() -> anyhow::Result<()> {
    let seconds = Poll::until(rtc(Instant::now(), 12), Duration::from_millis(250)).then(Dedup);

    let clock = seconds
        .clone()
        .then(pipe(|s: u64| format!("{:02}:{:02}", s / 60, s % 60)))
        .into_sink(consumer(|text: String| println!("{text}")));

    let ticker = seconds
        .then(pipe(|s: u64| s / 5))
        .then(Dedup)
        .into_sink(consumer(|block: u64| {
            tracing::info!(block, "another five seconds");
        }));

    gather([clock.spawn(), ticker.spawn()]).await?;
    Ok(())
}
