use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::time::{Duration, sleep};

use rill_core::domain::{Chunk, Encoding, StreamError};
use rill_core::impls::ChannelDiagnostic;
use rill_core::ports::{LineFormatter, Sink};
use rill_core::{ConsoleWriter, ReadableCore, WritableCore};

/// Sink that fails the first `n` accepts, then recovers.
struct FlakySink {
    remaining_failures: AtomicU32,
}

impl FlakySink {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl Sink for FlakySink {
    async fn accept(&self, chunk: Chunk, _encoding: Encoding) -> Result<(), StreamError> {
        // 完了は次のターンで返す
        tokio::task::yield_now().await;

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(StreamError::sink(format!("intentional failure (left={left})")));
        }

        print!("sink <- {chunk}");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // (A) 書き込み先とコンソールライターを用意
    let target = WritableCore::new(Arc::new(FlakySink::new(2)));
    let (diagnostics, mut reports) = ChannelDiagnostic::new();
    let console = ConsoleWriter::new(
        target.clone(),
        target.clone(),
        Arc::new(LineFormatter),
        Arc::new(diagnostics),
    );

    // (B) 失敗するシンクに向かって普通に書く（どの呼び出しも panic しない）
    console.dir(&["first write, doomed"]);
    console.log(&["second write, doomed"]);
    console.warn(&["third write, lands"]);
    println!("all three calls returned normally");

    // (C) 遅延して届く診断レポートを回収する
    sleep(Duration::from_millis(50)).await;
    while let Ok(failure) = reports.try_recv() {
        println!(
            "deferred failure: level={} error={}",
            failure.level, failure.error
        );
    }
    println!(
        "writable status: {}",
        serde_json::to_string_pretty(&target.status()).expect("status serializes")
    );

    // (D) readable 側の終了順序を見る: destroy が end を永久に抑止する
    let stream = ReadableCore::new();
    let mut events = stream.subscribe();
    stream.destroy();
    stream.push_end(); // 遅れてきた終端シグナルは無視される
    assert!(!stream.push(Chunk::from("late data")));

    while let Ok(event) = events.try_recv() {
        println!("readable event: {event:?}");
    }
    println!(
        "readable status: {}",
        serde_json::to_string_pretty(&stream.status()).expect("status serializes")
    );
}
