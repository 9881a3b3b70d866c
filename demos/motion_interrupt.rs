//! Keeping a light on after motion was sensed.
//!
//! The sensor raises an interrupt on every edge,
//! simulated by a thread which only touches the
//! pin level and the interrupt trigger.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use trickle::flow::prelude::*;
use trickle::flow::{Hold, Interrupt, consumer, gather};

#[trickle::main]
async fn main() -> anyhow::Result<()> {
    let level = Arc::new(AtomicBool::new(false));
    let pin = level.clone();
    let sensor = Interrupt::new(move || pin.load(Ordering::Acquire));
    let trigger = sensor.trigger();

    let isr = std::thread::spawn(move || {
        for edge in [true, false, true, false, true, false] {
            std::thread::sleep(Duration::from_millis(400));
            level.store(edge, Ordering::Release);
            trigger.set();
        }
    });

    let light = Hold::new(false, Duration::from_secs(2));
    let sensing = sensor.into_sink(light.clone()).spawn();
    let lighting = light
        .into_sink(consumer(|on: bool| {
            println!("light {}", if on { "on" } else { "off" });
        }))
        .spawn();

    sleep(Duration::from_secs(5)).await;
    if isr.join().is_err() {
        anyhow::bail!("interrupt simulation panicked");
    }
    sensing.cancel();
    lighting.cancel();
    gather([sensing, lighting]).await?;
    Ok(())
}
