//! Serve command - answer pack requests from stdin
//!
//! One request per line. Requests run concurrently, so replies can arrive
//! out of order; every reply line starts with the number of the request it
//! answers (1 for the first request line, counting only lines that carry a
//! request):
//!
//! ```text
//! pack <game> <mod>...   ->  <n> ok <hit|miss> <path>  |  <n> err <message>
//! stats                  ->  <n> entries <count>, then `<n> entry <key> <path>` per entry
//! quit                   ->  (stops reading, pending requests still answered)
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Error messages are
//! folded onto a single line. All requests share one artifact store for the
//! lifetime of the process.

use crate::config::Config;
use crate::error::{PackcacheError, PackcacheResult};
use crate::service::PackService;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// A parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeRequest {
    Pack { game: String, mods: Vec<String> },
    Stats,
    Quit,
}

impl ServeRequest {
    /// Parse one line; `None` for lines that carry no request
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut words = line.split_whitespace();
        let request = match words.next() {
            Some("pack") => match words.next() {
                Some(game) => Ok(Self::Pack {
                    game: game.to_string(),
                    mods: words.map(str::to_string).collect(),
                }),
                None => Err("usage: pack <game> <mod>...".to_string()),
            },
            Some("stats") => Ok(Self::Stats),
            Some("quit") => Ok(Self::Quit),
            Some(other) => Err(format!("unknown request `{}`", other)),
            None => return None,
        };
        Some(request)
    }
}

/// Execute the serve command
pub async fn execute(config: &Config) -> PackcacheResult<()> {
    let service = Arc::new(PackService::from_config(config)?);
    info!("Reading pack requests from stdin");

    serve_lines(
        Arc::clone(&service),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    debug!("Input closed, {} cached artifact(s) left", service.store().len());
    Ok(())
}

/// Answer every request read from `input`, writing tagged replies to `output`
///
/// Each request runs in its own task; a single writer task owns `output` so
/// reply lines of different requests never interleave. Returns `output` once
/// input is exhausted (or `quit` is read) and every pending reply is written.
pub async fn serve_lines<R, W>(
    service: Arc<PackService>,
    input: R,
    output: W,
) -> PackcacheResult<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Vec<String>>();
    let writer = tokio::spawn(write_replies(rx, output));

    let mut tasks = JoinSet::new();
    let mut lines = input.lines();
    let mut seq: u64 = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| PackcacheError::io("reading request", e))?
    {
        let request = match ServeRequest::parse(&line) {
            None => continue,
            Some(Ok(ServeRequest::Quit)) => break,
            Some(request) => request,
        };
        seq += 1;
        let id = seq;

        let service = Arc::clone(&service);
        let tx = tx.clone();
        tasks.spawn(async move {
            let reply = match request {
                Ok(request) => respond(&service, request).await,
                Err(message) => vec![format!("err {}", message)],
            };
            let tagged = reply.into_iter().map(|l| format!("{} {}", id, l)).collect();
            if tx.send(tagged).is_err() {
                warn!("Reply writer stopped, dropping reply to request {}", id);
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("Request task failed: {}", e);
        }
    }
    drop(tx);

    writer
        .await
        .map_err(|e| PackcacheError::Internal(format!("reply writer: {}", e)))?
}

async fn write_replies<W>(
    mut rx: mpsc::UnboundedReceiver<Vec<String>>,
    mut output: W,
) -> PackcacheResult<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        for line in reply {
            output
                .write_all(format!("{}\n", line).as_bytes())
                .await
                .map_err(|e| PackcacheError::io("writing reply", e))?;
        }
        output
            .flush()
            .await
            .map_err(|e| PackcacheError::io("writing reply", e))?;
    }
    Ok(output)
}

/// Answer a single request (untagged)
pub async fn respond(service: &PackService, request: ServeRequest) -> Vec<String> {
    match request {
        ServeRequest::Pack { game, mods } => match service.request(&game, &mods).await {
            Ok(artifact) => vec![format!(
                "ok {} {}",
                if artifact.cached { "hit" } else { "miss" },
                artifact.path.display()
            )],
            Err(e) => vec![format!("err {}", single_line(&e.to_string()))],
        },
        ServeRequest::Stats => {
            let entries = service.store().entries();
            let mut reply = vec![format!("entries {}", entries.len())];
            reply.extend(
                entries
                    .iter()
                    .map(|e| format!("entry {} {}", e.key, e.path.display())),
            );
            reply
        }
        ServeRequest::Quit => vec![],
    }
}

/// Fold a possibly multi-line message (packer stderr) onto one line
fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
