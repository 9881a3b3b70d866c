//! Fading a lamp towards the brightness set on a knob.

use std::time::Duration;
use tokio::time::sleep;
use trickle::flow::prelude::*;
use trickle::flow::easing::ease_in_out;
use trickle::flow::{EasedValue, Poll, consumer, pipe};

#[trickle::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = [0.8, 0.8, 0.2, 1.0, 0.0].into_iter();
    let knob = Poll::until(move || settings.next(), Duration::from_millis(700));

    let lamp = EasedValue::with_easing(
        0.0,
        ease_in_out,
        Duration::from_millis(600),
        Duration::from_millis(40),
    );
    let showing = lamp
        .clone()
        .then(pipe(|level: f64| "#".repeat((level * 40.0).round() as usize)))
        .into_sink(consumer(|bar: String| println!("[{bar:<40}]")))
        .spawn();

    knob.into_sink(lamp).drive().await?;
    sleep(Duration::from_secs(1)).await;
    showing.cancel();
    showing.await?;
    Ok(())
}
