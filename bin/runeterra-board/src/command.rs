//! Console line parsing.

use anyhow::{anyhow, bail, Context};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get(String),
    Post(String, Value),
    Put(String, Value),
    Delete(String),
    Upload(Vec<PathBuf>),
    Stats,
    ClearPosts,
    ClearAll,
    Logout,
    Help,
    Quit,
}

pub const HELP: &str = "\
GET <path>                  e.g. GET /posts?category=plaza
POST <path> [json]          e.g. POST /login {\"username\":\"Ahri\",\"password\":\"1234567\"}
PUT <path> [json]
DELETE <path>
UPLOAD <file>...            encode images via /upload-image
:stats  :clear-posts  :clear-all  :logout  :help  :quit";

impl Command {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            ":stats" => Command::Stats,
            ":clear-posts" => Command::ClearPosts,
            ":clear-all" => Command::ClearAll,
            ":logout" => Command::Logout,
            ":help" | ":h" => Command::Help,
            ":quit" | ":q" => Command::Quit,
            _ => match word.to_ascii_uppercase().as_str() {
                "GET" => Command::Get(path_only(rest)?),
                "DELETE" => Command::Delete(path_only(rest)?),
                "POST" => {
                    let (path, body) = path_and_body(rest)?;
                    Command::Post(path, body)
                }
                "PUT" => {
                    let (path, body) = path_and_body(rest)?;
                    Command::Put(path, body)
                }
                "UPLOAD" => {
                    let files: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                    if files.is_empty() {
                        bail!("UPLOAD needs at least one file");
                    }
                    Command::Upload(files)
                }
                other => bail!("unknown command {other:?} (try :help)"),
            },
        };
        Ok(Some(command))
    }
}

fn path_only(rest: &str) -> anyhow::Result<String> {
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [path] if path.starts_with('/') => Ok(path.to_string()),
        _ => Err(anyhow!("expected a single path starting with '/'")),
    }
}

fn path_and_body(rest: &str) -> anyhow::Result<(String, Value)> {
    let (path, body) = match rest.split_once(char::is_whitespace) {
        Some((path, body)) => (path, body.trim()),
        None => (rest, ""),
    };
    if !path.starts_with('/') {
        bail!("expected a path starting with '/'");
    }
    let body = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(body).context("request body is not valid JSON")?
    };
    Ok((path.to_string(), body))
}
