//! Chunked file upload
//!
//! The whole file is read into memory and sent in a fixed number of segments
//! so progress can be drawn as a bar with one mark per segment. The last
//! segment carries the remainder, so every byte of the file is sent.

use crate::core::display::{Channel, Display};
use crate::core::transport::{TransportError, TransportTrait};
use std::io::{self, Read};
use std::ops::Range;
use thiserror::Error;

/// Default number of progress segments
pub const DEFAULT_SEGMENTS: usize = 40;

/// Default preview limit in bytes
pub const DEFAULT_PREVIEW_LIMIT: usize = 4096;

const PROGRESS_PENDING: &str = "░";
const PROGRESS_DONE: &str = "▓";

/// Upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    /// The source could not be read; nothing was sent
    #[error("Cannot read file: {0}")]
    Read(#[source] io::Error),

    /// The transport failed mid-transfer
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Summary of a finished upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    /// File size
    pub total: usize,
    /// Bytes handed to the transport
    pub sent: usize,
    /// Number of transport writes
    pub writes: usize,
}

/// Segment bookkeeping for one transfer
#[derive(Debug)]
pub struct UploadJob {
    content: Vec<u8>,
    segments: usize,
    segment_size: usize,
    index: usize,
    sent: usize,
}

impl UploadJob {
    /// Plan `content` into `segments` segments (at least 2)
    pub fn new(content: Vec<u8>, segments: usize) -> Self {
        let segments = segments.max(2);
        let segment_size = content.len() / (segments - 1);
        Self {
            content,
            segments,
            segment_size,
            index: 0,
            sent: 0,
        }
    }

    /// Total segment count
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Bytes per regular segment
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Bytes accounted for so far
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// File content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Byte range of the next segment; the last one runs to the end of the file
    pub fn next_range(&mut self) -> Option<Range<usize>> {
        if self.index >= self.segments {
            return None;
        }
        let start = self.index * self.segment_size;
        let end = if self.index + 1 == self.segments {
            self.content.len()
        } else {
            start + self.segment_size
        };
        self.index += 1;
        self.sent += end - start;
        Some(start..end)
    }
}

/// Sends files through a transport with progress output
#[derive(Debug, Clone, Copy)]
pub struct FileUploader {
    segments: usize,
    preview_limit: usize,
}

impl Default for FileUploader {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENTS, DEFAULT_PREVIEW_LIMIT)
    }
}

impl FileUploader {
    /// Create an uploader; `segments` is raised to at least 2
    pub fn new(segments: usize, preview_limit: usize) -> Self {
        Self {
            segments: segments.max(2),
            preview_limit,
        }
    }

    /// Read `source` completely and send it
    ///
    /// `source` is dropped before returning on every path. Without a
    /// transport nothing is sent and no progress or preview is drawn.
    pub fn upload<R, D>(
        &self,
        mut source: R,
        transport: Option<&mut dyn TransportTrait>,
        display: &mut D,
    ) -> Result<UploadReport, UploadError>
    where
        R: Read,
        D: Display + ?Sized,
    {
        let mut content = Vec::new();
        source.read_to_end(&mut content).map_err(UploadError::Read)?;
        drop(source);

        let total = content.len();
        let Some(transport) = transport else {
            display.info(&format!("No port attached, {total} bytes not sent.\n"));
            return Ok(UploadReport {
                total,
                sent: 0,
                writes: 0,
            });
        };

        tracing::info!(bytes = total, segments = self.segments, "file upload started");
        let mut job = UploadJob::new(content, self.segments);
        let mut writes = 0;

        display.message(
            &format!("{}\r", PROGRESS_PENDING.repeat(job.segments())),
            Channel::Sent,
        );
        while let Some(range) = job.next_range() {
            if !range.is_empty() {
                transport.write(&job.content()[range])?;
                writes += 1;
            }
            display.message(PROGRESS_DONE, Channel::Sent);
        }
        display.message("\n", Channel::Sent);

        if total <= self.preview_limit {
            display.hexdump(job.content(), Channel::Sent);
        } else {
            display.message(&format!("[BINARY DATA {total} BYTES]\n"), Channel::Sent);
        }
        display.info("Transmission done.\n");
        tracing::info!(bytes = job.sent(), writes, "file upload finished");

        Ok(UploadReport {
            total,
            sent: job.sent(),
            writes,
        })
    }
}
