//! Request lines and their replies.
//!
//! One request per line, whitespace separated:
//!
//! ```text
//! create /notes 644
//! write /notes 0 hello there
//! read /notes 0 5
//! ls /
//! ```

use ramdisk_kernel::{VfsError, VfsOps};
use rustix::io::Errno;
use thiserror::Error;

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Getattr(String),
    Ls(String),
    Create { path: String, mode: u32 },
    Mkdir { path: String, mode: u32 },
    Read { path: String, offset: u64, size: u32 },
    Write { path: String, offset: u64, data: Vec<u8> },
    Truncate { path: String, size: u64 },
    Unlink(String),
    Rmdir(String),
    Touch(String),
    Statfs,
}

/// A request line that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("usage: {0}")]
pub struct UsageError(pub &'static str);

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest),
        None => (s, ""),
    }
}

fn required<'a>(token: &'a str, usage: &'static str) -> Result<&'a str, UsageError> {
    if token.is_empty() {
        Err(UsageError(usage))
    } else {
        Ok(token)
    }
}

fn number<T: std::str::FromStr>(token: &str, usage: &'static str) -> Result<T, UsageError> {
    token.parse().map_err(|_| UsageError(usage))
}

fn mode(token: &str, default: u32, usage: &'static str) -> Result<u32, UsageError> {
    if token.is_empty() {
        return Ok(default);
    }
    u32::from_str_radix(token.trim_start_matches("0o"), 8).map_err(|_| UsageError(usage))
}

impl Command {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, UsageError> {
        // Only the terminator goes; trailing spaces may be write payload.
        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        if line.trim_end().is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = next_token(line);
        let (path, rest) = next_token(rest);
        let command = match name {
            "getattr" | "stat" => {
                Command::Getattr(required(path, "getattr PATH")?.to_string())
            }
            "ls" | "readdir" => Command::Ls(required(path, "ls PATH")?.to_string()),
            "create" => {
                const USAGE: &str = "create PATH [MODE]";
                let (m, _) = next_token(rest);
                Command::Create {
                    path: required(path, USAGE)?.to_string(),
                    mode: mode(m, DEFAULT_FILE_MODE, USAGE)?,
                }
            }
            "mkdir" => {
                const USAGE: &str = "mkdir PATH [MODE]";
                let (m, _) = next_token(rest);
                Command::Mkdir {
                    path: required(path, USAGE)?.to_string(),
                    mode: mode(m, DEFAULT_DIR_MODE, USAGE)?,
                }
            }
            "read" => {
                const USAGE: &str = "read PATH OFFSET SIZE";
                let (offset, rest) = next_token(rest);
                let (size, _) = next_token(rest);
                Command::Read {
                    path: required(path, USAGE)?.to_string(),
                    offset: number(offset, USAGE)?,
                    size: number(size, USAGE)?,
                }
            }
            "write" => {
                const USAGE: &str = "write PATH OFFSET TEXT";
                // Everything after the offset's delimiter is payload, spaces included.
                let (offset, data) = next_token(rest);
                Command::Write {
                    path: required(path, USAGE)?.to_string(),
                    offset: number(offset, USAGE)?,
                    data: data.as_bytes().to_vec(),
                }
            }
            "truncate" => {
                const USAGE: &str = "truncate PATH SIZE";
                let (size, _) = next_token(rest);
                Command::Truncate {
                    path: required(path, USAGE)?.to_string(),
                    size: number(size, USAGE)?,
                }
            }
            "unlink" | "rm" => Command::Unlink(required(path, "unlink PATH")?.to_string()),
            "rmdir" => Command::Rmdir(required(path, "rmdir PATH")?.to_string()),
            "touch" | "utimens" => Command::Touch(required(path, "touch PATH")?.to_string()),
            "statfs" | "df" => Command::Statfs,
            _ => {
                return Err(UsageError(
                    "getattr|ls|create|mkdir|read|write|truncate|unlink|rmdir|touch|statfs ...",
                ));
            }
        };
        Ok(Some(command))
    }

    /// Run against a filesystem and format the reply line.
    pub async fn execute(&self, fs: &dyn VfsOps) -> String {
        match self.run(fs).await {
            Ok(reply) if reply.is_empty() => "ok".to_string(),
            Ok(reply) => format!("ok {reply}"),
            Err(e) => error_reply(&e),
        }
    }

    async fn run(&self, fs: &dyn VfsOps) -> Result<String, VfsError> {
        match self {
            Command::Getattr(path) => {
                let attr = fs.getattr(path).await?;
                Ok(format!(
                    "mode={:o} size={} nlink={} uid={} gid={}",
                    attr.mode(),
                    attr.size,
                    attr.nlink,
                    attr.uid,
                    attr.gid
                ))
            }
            Command::Ls(path) => {
                let entries = fs.readdir(path).await?;
                let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
                Ok(names.join(" "))
            }
            Command::Create { path, mode } => fs.create(path, *mode).await.map(|_| String::new()),
            Command::Mkdir { path, mode } => fs.mkdir(path, *mode).await.map(|_| String::new()),
            Command::Read { path, offset, size } => {
                let data = fs.read(path, *offset, *size).await?;
                Ok(format!("{} {}", data.len(), String::from_utf8_lossy(&data)))
            }
            Command::Write { path, offset, data } => {
                let written = fs.write(path, *offset, data).await?;
                Ok(written.to_string())
            }
            Command::Truncate { path, size } => fs.truncate(path, *size).await.map(|_| String::new()),
            Command::Unlink(path) => fs.unlink(path).await.map(|_| String::new()),
            Command::Rmdir(path) => fs.rmdir(path).await.map(|_| String::new()),
            Command::Touch(path) => fs.utimens(path).await.map(|_| String::new()),
            Command::Statfs => {
                let st = fs.statfs().await?;
                Ok(format!(
                    "blocks={} free={} bsize={} namemax={}",
                    st.blocks, st.bfree, st.bsize, st.namelen
                ))
            }
        }
    }
}

/// `err <negative errno> <message>`.
pub fn error_reply(e: &VfsError) -> String {
    format!("err {} {}", e.return_code(), e)
}

/// Reply for an unparseable line; reported as EINVAL.
pub fn usage_reply(e: &UsageError) -> String {
    format!("err {} {}", -Errno::INVAL.raw_os_error(), e)
}
