//! VFS error types.
//!
//! Every failed request maps to exactly one POSIX error number. The driver
//! layer relays [`VfsError::return_code`] unchanged.

use rustix::io::Errno;
use std::io;
use thiserror::Error;

/// VFS error type.
#[derive(Debug, Error)]
pub enum VfsError {
    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Path already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Directory not empty.
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// Every slot in the namespace table is occupied.
    #[error("no free slot in namespace table")]
    NoSpace,

    /// Write or truncate past the content capacity.
    #[error("file too large: {path} (limit {limit} bytes)")]
    FileTooLarge {
        /// Path of the file.
        path: String,
        /// Content capacity in bytes.
        limit: u64,
    },

    /// Invalid path or name.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// File name too long.
    #[error("file name too long: {0}")]
    NameTooLong(String),

    /// Buffer preparation failed.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Entry is in use and cannot be removed (the root).
    #[error("resource busy: {0}")]
    Busy(String),

    /// Namespace invariant violated; never a caller error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create a DirectoryNotEmpty error.
    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty(path.into())
    }

    /// Create a FileTooLarge error.
    pub fn file_too_large(path: impl Into<String>, limit: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            limit,
        }
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create a NameTooLong error.
    pub fn name_too_long(name: impl Into<String>) -> Self {
        Self::NameTooLong(name.into())
    }

    /// Create an Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The POSIX error number for this error.
    pub fn errno(&self) -> Errno {
        match self {
            VfsError::NotFound(_) => Errno::NOENT,
            VfsError::AlreadyExists(_) => Errno::EXIST,
            VfsError::NotADirectory(_) => Errno::NOTDIR,
            VfsError::IsADirectory(_) => Errno::ISDIR,
            VfsError::DirectoryNotEmpty(_) => Errno::NOTEMPTY,
            VfsError::NoSpace => Errno::NOSPC,
            VfsError::FileTooLarge { .. } => Errno::FBIG,
            VfsError::InvalidPath(_) => Errno::INVAL,
            VfsError::NameTooLong(_) => Errno::NAMETOOLONG,
            VfsError::OutOfMemory(_) => Errno::NOMEM,
            VfsError::Busy(_) => Errno::BUSY,
            VfsError::Internal(_) => Errno::IO,
        }
    }

    /// Negative error number, as returned to the driver-dispatch layer.
    pub fn return_code(&self) -> i32 {
        -self.errno().raw_os_error()
    }

    /// Returns true for the not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        let kind = match &e {
            VfsError::NotFound(_) => io::ErrorKind::NotFound,
            VfsError::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            VfsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            VfsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
            VfsError::DirectoryNotEmpty(_) => io::ErrorKind::DirectoryNotEmpty,
            VfsError::NoSpace => io::ErrorKind::StorageFull,
            VfsError::FileTooLarge { .. } => io::ErrorKind::FileTooLarge,
            VfsError::InvalidPath(_) | VfsError::NameTooLong(_) => io::ErrorKind::InvalidInput,
            VfsError::OutOfMemory(_) => io::ErrorKind::OutOfMemory,
            VfsError::Busy(_) => io::ErrorKind::ResourceBusy,
            VfsError::Internal(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, e.to_string())
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
