//! Newline-delimited JSON command loop.
//!
//! Each input line is a [`Request`]; each produces exactly one response line, in order.

mod dispatch;
mod protocol;

use anyhow::Result;
use log::{debug, warn};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{error::AppError, AppState};

pub use dispatch::{dispatch, COMMANDS};
pub use protocol::{ErrorBody, Request};

/// Run one request to completion and render its response line.
pub async fn handle(state: &AppState, request: Request) -> Value {
    let id = request.id.clone();
    let command = request.command.clone();

    match dispatch(state, request).await {
        Ok(result) => protocol::success(id, result),
        Err(err) => {
            match &err {
                AppError::Internal(inner) => warn!("{command} failed: {inner:#}"),
                other => debug!("{command} rejected: {other}"),
            }
            protocol::failure(id, ErrorBody::from(&err))
        }
    }
}

/// Serve requests from `reader` until it is exhausted.
///
/// Only reader and writer failures end the loop. A bad line, including one that is not
/// UTF-8, gets an `invalid_request` response and the loop moves on.
pub async fn serve<R, W>(state: &AppState, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match serde_json::from_str::<Request>(line.trim()) {
                Ok(request) => handle(state, request).await,
                Err(err) => protocol::malformed(format!("invalid request: {err}")),
            },
            Err(err) => protocol::malformed(format!("invalid request: {err}")),
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    debug!("Input closed; command loop finished");
    Ok(())
}
