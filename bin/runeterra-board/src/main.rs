//! # Runeterra Board Console
//!
//! Assembles the gateway over a file-backed or in-memory store and drives it
//! from stdin, one request per line.

mod command;

use anyhow::Context;
use log::info;
use rb_api::{GatewayConfig, MockApiGateway};
use rb_auth_simple::SimpleAuthProvider;
use rb_core::envelope::{ApiResult, RequestBody, UploadedFile};
use rb_core::traits::{ApiClient, KeyValueStore};
use rb_db_local::LocalBoardRepo;
use rb_storage_local::{FileStore, MemoryStore};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use command::{Command, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = GatewayConfig::from_env();

    // 1. Storage backend
    let backend: Arc<dyn KeyValueStore> = match std::env::var("RB_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => {
            info!("persisting board data under {dir}");
            Arc::new(FileStore::open(&dir)?)
        }
        _ => {
            info!("RB_DATA_DIR not set, board data lives in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // 2. Repository and auth policy
    let repo = LocalBoardRepo::new(backend);
    let auth = SimpleAuthProvider::new(&config.default_password);

    let gateway = MockApiGateway::new(Box::new(repo), Box::new(auth), config);
    info!("Runeterra Board console ready (:help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e:#}");
                continue;
            }
        };

        let output = match command {
            Command::Quit => break,
            Command::Help => HELP.to_string(),
            Command::Stats => serde_json::to_string_pretty(&gateway.stats())?,
            Command::ClearPosts => {
                gateway.clear_posts_data();
                "posts, replies and likes cleared".to_string()
            }
            Command::ClearAll => {
                gateway.clear_all_data();
                "all board data cleared".to_string()
            }
            Command::Logout => {
                gateway.logout();
                "logged out".to_string()
            }
            Command::Get(path) => render(gateway.get(&path).await)?,
            Command::Delete(path) => render(gateway.delete(&path).await)?,
            Command::Post(path, body) => render(gateway.post(&path, body.into()).await)?,
            Command::Put(path, body) => render(gateway.put(&path, body.into()).await)?,
            Command::Upload(paths) => match read_files(&paths) {
                Ok(files) => render(gateway.post("/upload-image", RequestBody::Files(files)).await)?,
                Err(e) => format!("{e:#}"),
            },
        };
        println!("{output}");
    }
    Ok(())
}

fn render(result: ApiResult) -> anyhow::Result<String> {
    let envelope = match result {
        Ok(response) => serde_json::to_value(response)?,
        Err(error) => json!({ "error": error }),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn read_files(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<UploadedFile>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(UploadedFile {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                content_type: None,
                bytes,
            })
        })
        .collect()
}
