//! Line-oriented request dispatcher for the ramdisk filesystem.
//!
//! Stands in for a kernel driver transport: each input line is one request,
//! each output line is the reply (`ok ...` or `err <negative errno> ...`).
//!
//! ## Module Structure
//!
//! - `command`: Request parsing and reply formatting

pub mod command;

use anyhow::Result;
use ramdisk_kernel::VfsOps;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use command::{Command, usage_reply};

/// Counts for one dispatch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Requests that produced a reply.
    pub requests: usize,
    /// Replies that were errors (usage errors included).
    pub errors: usize,
}

/// Dispatch every line of `input` against `fs`, writing replies to `output`.
///
/// Request failures are replies, not errors; only I/O on the streams ends
/// the session early.
pub async fn serve<R, W>(fs: &dyn VfsOps, input: R, mut output: W) -> Result<SessionStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = SessionStats::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                tracing::debug!(?command, "dispatch");
                command.execute(fs).await
            }
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "unparseable request");
                usage_reply(&e)
            }
        };

        stats.requests += 1;
        if reply.starts_with("err") {
            stats.errors += 1;
        }
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }

    output.flush().await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramdisk_kernel::{RamdiskBackend, VfsError};

    async fn session(script: &str) -> (Vec<String>, SessionStats) {
        let fs = RamdiskBackend::new();
        let mut out = Vec::new();
        let stats = serve(&fs, script.as_bytes(), &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        (text.lines().map(str::to_string).collect(), stats)
    }

    #[tokio::test]
    async fn test_scenario_session() {
        let script = "\
# build a small tree
create /a
mkdir /b
create /b/c
ls /
ls /b
write /b/c 0 0123456789
read /b/c 0 10
unlink /a
ls /
rmdir /b
unlink /b/c
rmdir /b
ls /
";
        let (replies, stats) = session(script).await;
        let not_empty = VfsError::directory_not_empty("/b");
        let not_empty_reply = format!("err {} {}", not_empty.return_code(), not_empty);
        assert_eq!(
            replies,
            vec![
                "ok",
                "ok",
                "ok",
                "ok . .. a b",
                "ok . .. c",
                "ok 10",
                "ok 10 0123456789",
                "ok",
                "ok . .. b",
                not_empty_reply.as_str(),
                "ok",
                "ok",
                "ok . ..",
            ]
        );
        assert_eq!(stats.requests, 13);
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_stop_session() {
        let (replies, stats) = session("bogus\nls\n\ncreate /x\n").await;
        assert_eq!(replies.len(), 3);
        assert!(replies[0].starts_with("err "));
        assert!(replies[1].starts_with("err "));
        assert_eq!(replies[2], "ok");
        assert_eq!(stats.errors, 2);
    }
}
