//! Storage node server binary.
//!
//! `ringkv-node <PORT> [--wal-dir <DIR>]`
//!
//! Holds one shard of the cluster's key space in memory and serves the wire
//! protocol on `0.0.0.0:PORT`. With `--wal-dir` set, writes are appended to
//! `<DIR>/wal-<PORT>.log` and replayed before the node accepts traffic.

use std::net::SocketAddr;
use std::path::PathBuf;

use ringkv::storage::handlers::{app, NodeState};
use ringkv::storage::shards::ShardedStore;
use ringkv::storage::wal::WriteLog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <PORT> [--wal-dir <DIR>]", args[0]);
        eprintln!("Example: {} 8081", args[0]);
        std::process::exit(1);
    }

    let port: u16 = args[1].parse()?;

    let mut wal_dir: Option<PathBuf> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--wal-dir" => {
                wal_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let store = ShardedStore::new();

    let wal = match wal_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let path = dir.join(format!("wal-{}.log", port));
            let applied = WriteLog::replay(&path, &store)?;
            tracing::info!(
                "Replayed {} write log records from {}",
                applied,
                path.display()
            );
            Some(WriteLog::open(&path)?)
        }
        None => None,
    };

    let state = NodeState::new(store, wal);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Storage node listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
