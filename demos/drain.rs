//! # Example: drain
//!
//! A journal (here: a bounded channel drained by a writer task) is shared by several
//! producers. On Ctrl-C the gate stops admitting writes, lets in-flight writes finish,
//! and only then closes the journal.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► writer task: prints every line until the journal closes
//!   ├─► producers: gate.submit_with_token(write line) in a loop
//!   └─► gate.run_until_signal()
//!         ├─ Ctrl-C → admission closed, producers get GateError::Closed
//!         ├─ in-flight writes finish
//!         └─ closer closes the journal (drops its only sender) → writer exits
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example drain --features logging
//! ```

use std::sync::{Arc, RwLock};
use std::time::Duration;

use drainkeeper::{CloseError, CloserFn, Gate, GateConfig, GateError, Subscribe};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Append-only journal; `close` drops the only sender, which stops the writer.
struct Journal {
    tx: RwLock<Option<mpsc::Sender<String>>>,
}

impl Journal {
    fn open() -> (Arc<Self>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(64);
        let journal = Arc::new(Self {
            tx: RwLock::new(Some(tx)),
        });
        (journal, rx)
    }

    async fn append(&self, line: String) -> anyhow::Result<()> {
        let tx = self
            .tx
            .read()
            .map_err(|_| anyhow::anyhow!("journal lock poisoned"))?
            .clone();
        let tx = tx.ok_or_else(|| anyhow::anyhow!("journal closed"))?;
        tx.send(line).await?;
        Ok(())
    }

    fn close(&self) -> Result<(), CloseError> {
        self.tx
            .write()
            .map_err(|_| CloseError::failed("journal lock poisoned"))?
            .take();
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== drain example (press Ctrl-C to stop) ===\n");

    // 1. The guarded resource.
    let (journal, mut lines) = Journal::open();
    let writer = tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            println!("[journal] {line}");
        }
        println!("[journal] closed");
    });

    // 2. Optional: add subscriber to see lifecycle events (requires "logging" feature)
    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(drainkeeper::LogWriter)];
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    // 3. Gate whose closer closes the journal.
    let gate = Gate::builder(GateConfig::named("journal"))
        .with_closer({
            let journal = Arc::clone(&journal);
            CloserFn::boxed("journal", move || async move { journal.close() })
        })
        .with_subscribers(subs)
        .build();

    // 4. Producers.
    let mut producers = Vec::new();
    for id in 0..3 {
        let gate = Arc::clone(&gate);
        let journal = Arc::clone(&journal);
        producers.push(tokio::spawn(async move {
            let mut seq = 0u32;
            loop {
                seq += 1;
                let res = gate
                    .submit_with_token(|ctx: CancellationToken| {
                        let journal = Arc::clone(&journal);
                        async move {
                            // Slow write: finishes even if shutdown arrives meanwhile.
                            tokio::time::sleep(Duration::from_millis(300)).await;
                            let note = if ctx.is_cancelled() { " (draining)" } else { "" };
                            journal.append(format!("producer={id} seq={seq}{note}")).await
                        }
                    })
                    .await;
                match res {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => println!("[producer {id}] write failed: {e}"),
                    Err(GateError::Closed) => {
                        println!("[producer {id}] gate closed after {} writes", seq - 1);
                        return;
                    }
                    Err(e) => {
                        println!("[producer {id}] unexpected: {e}");
                        return;
                    }
                }
            }
        }));
    }

    // 5. Controller: waits for Ctrl-C, drains, closes the journal.
    gate.run_until_signal().await?;
    writer.await?;

    for p in producers {
        p.await?;
    }
    Ok(())
}
