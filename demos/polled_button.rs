//! Reading a bouncing push button by polling.

use std::time::Duration;
use tokio::time::Instant;
use trickle::flow::prelude::*;
use trickle::flow::{DEFAULT_DEBOUNCE, Debounce, Dedup, Poll, consumer};

/// Simulated pin: pressed for a while every second,
/// chattering for a few milliseconds on each edge.
fn button(boot: Instant, presses: u128) -> impl FnMut() -> Option<bool> {
    move || {
        let ms = boot.elapsed().as_millis();
        if ms / 1000 >= presses {
            return None;
        }
        let phase = ms % 1000;
        let level = match phase {
            0..300 => false,
            300..306 | 600..606 => phase % 2 == 0,
            306..600 => true,
            _ => false,
        };
        Some(level)
    }
}

#[trickle::main]
async fn main() -> anyhow::Result<()> {
    Poll::until(button(Instant::now(), 3), Duration::from_millis(1))
        .then(Debounce::new(DEFAULT_DEBOUNCE))
        .then(Dedup)
        .into_sink(consumer(|pressed: bool| {
            println!("{}", if pressed { "pressed" } else { "released" });
        }))
        .drive()
        .await?;
    Ok(())
}
