//! Fetch & verify
//!
//! Downloads a descriptor's source archive into the archives directory,
//! hashing it while it streams, and refuses to hand back a file whose SHA-1
//! differs from the declared checksum.
//!
//! ```no_run
//! use gig::acquire::{FetchOptions, Fetcher};
//! use gig::layout::StorageLayout;
//! use gig::manifest::Descriptor;
//!
//! let descriptor = Descriptor {
//!     url: "https://zlib.net/zlib-1.3.1.tar.gz".into(),
//!     checksum: "f535367b1a11e2f9ac3bec723fb007fbc0d189e5".into(),
//!     ..Default::default()
//! };
//! let layout = StorageLayout::new("/tmp/gig");
//! let archive = Fetcher::new(FetchOptions::default()).fetch(&descriptor, &layout)?;
//! # Ok::<(), gig::error::AcquireError>(())
//! ```

mod cancel;
pub mod hash;
pub mod progress;
mod transport;

pub use cancel::CancelToken;
pub use hash::file_checksum;
pub use transport::{Response, Transport, UreqTransport};

use crate::error::AcquireError;
use crate::extract;
use crate::layout::{self, StorageLayout};
use crate::manifest::Descriptor;
use crate::output;
use sha1::{Digest, Sha1};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Bytes read from the network per chunk.
    pub buffer_size: usize,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Overall limit for one fetch, checked between chunks.
    pub deadline: Option<Duration>,
    pub show_progress: bool,
    pub cancel: CancelToken,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deadline: None,
            show_progress: true,
            cancel: CancelToken::new(),
        }
    }
}

impl FetchOptions {
    /// No progress bars or status lines.
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }
}

/// Result of [`install_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    pub archive: PathBuf,
    pub source_dir: PathBuf,
}

type ProgressFn = Box<dyn FnMut(u64, Option<u64>)>;

pub struct Fetcher<T: Transport = UreqTransport> {
    transport: T,
    options: FetchOptions,
    on_progress: Option<ProgressFn>,
}

impl Fetcher<UreqTransport> {
    pub fn new(options: FetchOptions) -> Self {
        let transport = UreqTransport::new(options.timeout);
        Self::with_transport(transport, options)
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(transport: T, options: FetchOptions) -> Self {
        Self {
            transport,
            options,
            on_progress: None,
        }
    }

    /// Called after every chunk with the bytes received so far and the
    /// advertised total, if any.
    pub fn on_progress(mut self, f: impl FnMut(u64, Option<u64>) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Download and verify the descriptor's archive, returning its path.
    ///
    /// The file only appears under its final name once the whole body has
    /// arrived. On checksum mismatch it stays on disk.
    pub fn fetch(
        &mut self,
        descriptor: &Descriptor,
        layout: &StorageLayout,
    ) -> Result<PathBuf, AcquireError> {
        let (url, expected) = descriptor.require_source()?;
        layout::ensure_dir(layout.archives_dir())?;
        let dest = layout.archive_path(url);
        let started = Instant::now();

        if self.options.show_progress {
            output::sub_action(&format!("fetch {}", url));
        }

        let response = self.transport.get(url)?;
        let total = response.content_length;

        let pb = if self.options.show_progress {
            progress::create_spinner(&format!("downloading {}", layout::archive_filename(url)))
        } else {
            progress::hidden()
        };
        let _guard = progress::ProgressGuard::new(&pb);
        if let Some(len) = total {
            progress::upgrade_to_bytes(&pb, len);
        }

        // Streamed beside the final name and renamed over it once complete,
        // so an interrupted download never replaces an existing archive.
        let mut file = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(layout.archives_dir())
            .map_err(|e| AcquireError::StorageUnavailable {
                path: layout.archives_dir().to_path_buf(),
                reason: e.to_string(),
            })?;
        let mut body = response.body;
        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; self.options.buffer_size.max(1)];
        let mut received = 0u64;

        loop {
            if self.options.cancel.is_cancelled() {
                return Err(AcquireError::Cancelled {
                    url: url.to_string(),
                });
            }
            if let Some(deadline) = self.options.deadline {
                if started.elapsed() >= deadline {
                    return Err(AcquireError::DeadlineExceeded {
                        url: url.to_string(),
                    });
                }
            }

            let n = match body.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(AcquireError::Network {
                        url: url.to_string(),
                        message: format!("read error: {}", e),
                    });
                }
            };

            hasher.update(&buffer[..n]);
            file.write_all(&buffer[..n])?;
            received += n as u64;
            pb.set_position(received);
            if let Some(callback) = self.on_progress.as_mut() {
                callback(received, total);
            }
        }
        file.flush()?;
        file.persist(&dest).map_err(|e| AcquireError::StorageUnavailable {
            path: dest.clone(),
            reason: e.error.to_string(),
        })?;

        let actual = hex::encode(hasher.finalize());
        hash::verify(expected, &actual)?;

        if self.options.show_progress {
            output::detail(&format!("verified {} ({} bytes)", dest.display(), received));
        }
        Ok(dest)
    }

    /// Fetch, then extract into the layout's source directory. Nothing is
    /// extracted unless the checksum matched.
    pub fn install_source(
        &mut self,
        descriptor: &Descriptor,
        layout: &StorageLayout,
    ) -> Result<SourceTree, AcquireError> {
        let archive = self.fetch(descriptor, layout)?;
        let source_dir = extract::unpack_source(&archive, layout, self.options.show_progress)?;
        Ok(SourceTree {
            archive,
            source_dir,
        })
    }
}

/// Fetch with default options over HTTP.
pub fn fetch(descriptor: &Descriptor, layout: &StorageLayout) -> Result<PathBuf, AcquireError> {
    Fetcher::new(FetchOptions::default()).fetch(descriptor, layout)
}

/// Fetch over HTTP and unpack the verified archive.
pub fn install_source(
    descriptor: &Descriptor,
    layout: &StorageLayout,
    options: FetchOptions,
) -> Result<SourceTree, AcquireError> {
    Fetcher::new(options).install_source(descriptor, layout)
}
