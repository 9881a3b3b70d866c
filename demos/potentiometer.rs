//! Denoising a jittery analog reading.

use std::time::Duration;
use trickle::flow::prelude::*;
use trickle::flow::{Dedup, Ewma, Poll, consumer, pipe};

/// Simulated ADC: the knob sweeps slowly across its
/// range while every reading jitters by a few steps.
fn adc(samples: u32) -> impl FnMut() -> Option<f64> {
    let mut n = 0u32;
    let mut seed = 0x2545_f491u32;
    move || {
        n += 1;
        if n > samples {
            return None;
        }
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let jitter = f64::from(seed % 64) - 32.0;
        let sweep = f64::from(n) / f64::from(samples) * 4095.0;
        Some((sweep + jitter).clamp(0.0, 4095.0))
    }
}

#[trickle::main]
async fn main() -> anyhow::Result<()> {
    Poll::until(adc(200), Duration::from_millis(20))
        .then(Ewma::new(0.8))
        .then(pipe(|raw: f64| (raw / 4095.0 * 20.0).round() as u8 * 5))
        .then(Dedup)
        .into_sink(consumer(|percent: u8| println!("knob at {percent:>3}%")))
        .drive()
        .await?;
    Ok(())
}
