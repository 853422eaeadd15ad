//! Router REPL binary.
//!
//! Reads operator commands from stdin and drives the cluster: membership
//! changes trigger live migration, reads and writes resolve through the
//! ring. Runs on a current-thread runtime; everything is sequential by
//! design, which bounds open connections and keeps the write-then-delete
//! migration ordering observable.

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Command output goes to stdout; keep the log stream out of its way.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    ringkv::router::repl::run().await
}
