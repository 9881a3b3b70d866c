//! Echoing the terminal input back, in upper case.

use trickle::flow::prelude::*;
use trickle::flow::{ReadChars, WriteText, pipe};

#[trickle::main]
async fn main() -> anyhow::Result<()> {
    ReadChars::new(tokio::io::stdin())
        .then(pipe(|c: char| c.to_uppercase().collect::<String>()))
        .into_sink(WriteText::new(tokio::io::stdout()))
        .drive()
        .await?;
    Ok(())
}
