//! Export: the full decode → rotate → filter → encode → persist pipeline.
//!
//! Each [`ExportRequest`] carries its own copy of the [`AdjustmentState`],
//! taken when the request is built. Nothing that happens to the live
//! adjustments afterwards can reach an export in flight.
//!
//! ## Steps
//!
//! ```text
//! read source bytes
//!   → decode                      (Failed to load image)
//!   → read orientation tag        (never fails; unknown = upright)
//!   → rotate, apply combined matrix, release intermediates
//!   → encode                      (Failed to save image)
//!   → persist                     (Failed to save image)
//! ```
//!
//! There is no cancellation and no partial output: an export either yields a
//! [`StorageHandle`] or an [`ExportError`].
//!
//! ## Batch Export
//!
//! [`export_batch`] runs independent requests in parallel with
//! [rayon](https://docs.rs/rayon). Every request owns its snapshot and its
//! buffers, so workers share only the backend and the storage.

use crate::imaging::filters::build_combined_matrix;
use crate::imaging::render;
use crate::imaging::{
    AdjustmentState, BackendError, BufferLedger, ImageBackend, OutputFormat, Quality,
    resolve_rotation,
};
use crate::naming;
use crate::storage::{PersistError, Storage, StorageHandle};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: BackendError,
    },
    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: BackendError,
    },
    #[error("Failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: PersistError,
    },
}

impl ExportError {
    /// The message shown to the user for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            ExportError::Read { .. } | ExportError::Decode { .. } => Notice::LoadFailed,
            ExportError::Encode { .. } | ExportError::Persist { .. } => Notice::SaveFailed,
        }
    }
}

/// User-facing outcome messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    LoadFailed,
    SaveFailed,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::Saved => "Image saved",
            Notice::LoadFailed => "Failed to load image",
            Notice::SaveFailed => "Failed to save image",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Encoding and naming settings shared by every request in a run.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub name_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default(),
            name_prefix: "Image-Filtered".to_string(),
        }
    }
}

/// One source image and the adjustments captured for it.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: PathBuf,
    pub adjustments: AdjustmentState,
    pub settings: ExportSettings,
    /// Explicit file name; `None` derives one from the source and the clock.
    pub file_name: Option<String>,
    /// 1-based position in a batch, folded into derived names.
    pub sequence: Option<usize>,
}

impl ExportRequest {
    /// Capture `adjustments` by value for `source`.
    pub fn new(
        source: impl Into<PathBuf>,
        adjustments: AdjustmentState,
        settings: ExportSettings,
    ) -> Self {
        Self {
            source: source.into(),
            adjustments,
            settings,
            file_name: None,
            sequence: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_sequence(mut self, sequence: usize) -> Self {
        self.sequence = Some(sequence);
        self
    }

    fn resolved_file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            naming::export_file_name(
                &self.settings.name_prefix,
                &self.source,
                naming::now_millis(),
                self.sequence,
                self.settings.format,
            )
        })
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub source: PathBuf,
    pub handle: StorageHandle,
    pub width: u32,
    pub height: u32,
    pub rotation_degrees: u16,
}

/// Progress events for the CLI printer.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    Started { total: usize },
    Saved { index: usize, outcome: ExportOutcome },
    Failed { index: usize, source: PathBuf, notice: Notice, error: String },
}

/// Export a single image.
pub fn export_image(
    backend: &impl ImageBackend,
    storage: &impl Storage,
    request: &ExportRequest,
) -> Result<ExportOutcome, ExportError> {
    let path = &request.source;
    let bytes = std::fs::read(path).map_err(|source| ExportError::Read {
        path: path.clone(),
        source,
    })?;
    export_bytes(backend, storage, request, &bytes)
}

/// Export from bytes already in memory; `request.source` is only used for
/// naming and error context.
pub fn export_bytes(
    backend: &impl ImageBackend,
    storage: &impl Storage,
    request: &ExportRequest,
    bytes: &[u8],
) -> Result<ExportOutcome, ExportError> {
    let path = &request.source;
    let mut ledger = BufferLedger::new();

    let decoded = backend.decode(bytes).map_err(|source| ExportError::Decode {
        path: path.clone(),
        source,
    })?;
    ledger.track(&decoded);

    let rotation = resolve_rotation(backend.read_orientation(bytes));
    let matrix = build_combined_matrix(&request.adjustments);
    debug!(
        source = %path.display(),
        %rotation,
        filters = request.adjustments.active_filters().len(),
        "rendering export"
    );
    let mut output = render::render(decoded, rotation, &matrix, &mut ledger);
    let (width, height) = output.dimensions();

    let encoded = backend.encode(&output, request.settings.format, request.settings.quality);
    ledger.release_in_place(&mut output);
    debug!(
        tracked = ledger.tracked(),
        released = ledger.released(),
        outstanding = ledger.outstanding(),
        "export buffers released"
    );
    let encoded = encoded.map_err(|source| ExportError::Encode {
        path: path.clone(),
        source,
    })?;

    let handle = storage
        .persist(&encoded, &request.resolved_file_name())
        .map_err(|source| ExportError::Persist {
            path: path.clone(),
            source,
        })?;
    info!(source = %path.display(), output = %handle, "image saved");

    Ok(ExportOutcome {
        source: path.clone(),
        handle,
        width,
        height,
        rotation_degrees: rotation.degrees(),
    })
}

/// Totals for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub saved: usize,
    pub failed: usize,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} saved, {} failed", self.saved, self.failed)
    }
}

/// Export every request in parallel, reporting through `events`.
///
/// Failures don't stop the batch; results come back in request order.
pub fn export_batch(
    backend: &impl ImageBackend,
    storage: &impl Storage,
    requests: &[ExportRequest],
    events: Option<Sender<ExportEvent>>,
) -> (Vec<Result<ExportOutcome, ExportError>>, ExportSummary) {
    if let Some(tx) = &events {
        tx.send(ExportEvent::Started {
            total: requests.len(),
        })
        .ok();
    }

    let results: Vec<Result<ExportOutcome, ExportError>> = requests
        .par_iter()
        .enumerate()
        .map_with(events, |events, (index, request)| {
            let result = export_image(backend, storage, request);
            let event = match &result {
                Ok(outcome) => ExportEvent::Saved {
                    index: index + 1,
                    outcome: outcome.clone(),
                },
                Err(e) => {
                    warn!(source = %request.source.display(), error = %e, "export failed");
                    ExportEvent::Failed {
                        index: index + 1,
                        source: request.source.clone(),
                        notice: e.notice(),
                        error: e.to_string(),
                    }
                }
            };
            if let Some(tx) = events {
                tx.send(event).ok();
            }
            result
        })
        .collect();

    let saved = results.iter().filter(|r| r.is_ok()).count();
    let summary = ExportSummary {
        saved,
        failed: results.len() - saved,
    };
    (results, summary)
}

/// Requests for `sources` that all share one snapshot of `adjustments`.
///
/// Each request is numbered by its 1-based position so derived names stay
/// unique within the batch.
pub fn plan_requests(
    sources: &[impl AsRef<Path>],
    adjustments: AdjustmentState,
    settings: &ExportSettings,
) -> Vec<ExportRequest> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            ExportRequest::new(source.as_ref(), adjustments, settings.clone()).with_sequence(i + 1)
        })
        .collect()
}
