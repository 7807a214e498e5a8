//! Owned pixel buffers and their release bookkeeping.
//!
//! A [`PixelBuffer`] is either live (holds an RGBA8 image) or disposed.
//! Ownership moves forward through the render pipeline; each stage hands its
//! input to a [`BufferLedger`] once the successor buffer exists.
//!
//! Disposing twice is a no-op. Touching pixels after dispose is a bug in the
//! caller, so the plain accessors panic with [`LifecycleError`]; the `try_`
//! variants return it instead.

use image::RgbaImage;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, trace};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id, used in logs and lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("pixel buffer {0} used after dispose")]
    UseAfterDispose(BufferId),
}

enum BufferState {
    Live(RgbaImage),
    Disposed,
}

/// Exclusively owned RGBA8 image with an explicit live/disposed state.
pub struct PixelBuffer {
    id: BufferId,
    state: BufferState,
}

impl PixelBuffer {
    /// A transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let buffer = Self {
            id: BufferId::next(),
            state: BufferState::Live(image),
        };
        trace!(id = %buffer.id, "buffer created");
        buffer
    }

    /// Wrap raw RGBA8 bytes. `None` if the length doesn't match the size.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(Self::from_image)
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn is_live(&self) -> bool {
        matches!(self.state, BufferState::Live(_))
    }

    pub fn try_image(&self) -> Result<&RgbaImage, LifecycleError> {
        match &self.state {
            BufferState::Live(image) => Ok(image),
            BufferState::Disposed => Err(LifecycleError::UseAfterDispose(self.id)),
        }
    }

    /// # Panics
    /// If the buffer was disposed.
    pub fn image(&self) -> &RgbaImage {
        self.try_image().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn width(&self) -> u32 {
        self.image().width()
    }

    pub fn height(&self) -> u32 {
        self.image().height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image().dimensions()
    }

    /// Hand the pixels to the caller, consuming the buffer.
    pub fn into_image(self) -> Result<RgbaImage, LifecycleError> {
        match self.state {
            BufferState::Live(image) => Ok(image),
            BufferState::Disposed => Err(LifecycleError::UseAfterDispose(self.id)),
        }
    }

    /// Drop the pixel data. Returns whether anything was released.
    pub fn dispose(&mut self) -> bool {
        match std::mem::replace(&mut self.state, BufferState::Disposed) {
            BufferState::Live(_) => {
                trace!(id = %self.id, "buffer disposed");
                true
            }
            BufferState::Disposed => false,
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            BufferState::Live(image) => f
                .debug_struct("PixelBuffer")
                .field("id", &self.id)
                .field("width", &image.width())
                .field("height", &image.height())
                .finish(),
            BufferState::Disposed => f
                .debug_struct("PixelBuffer")
                .field("id", &self.id)
                .field("disposed", &true)
                .finish(),
        }
    }
}

/// Counts buffers a pipeline allocates and releases.
///
/// Only tracked buffers count as released, so `released <= tracked` always
/// holds. The final output of a pipeline is tracked but never released, so a
/// clean run ends with exactly one outstanding buffer per output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferLedger {
    outstanding: HashSet<BufferId>,
    tracked: usize,
    released: usize,
}

impl BufferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting `buffer`. Tracking the same buffer twice is a no-op.
    pub fn track(&mut self, buffer: &PixelBuffer) {
        if self.outstanding.insert(buffer.id()) {
            self.tracked += 1;
        }
        trace!(id = %buffer.id(), tracked = self.tracked, "buffer tracked");
    }

    /// Dispose `buffer`, counting it only the first time.
    pub fn release(&mut self, mut buffer: PixelBuffer) {
        self.release_in_place(&mut buffer);
    }

    pub fn release_in_place(&mut self, buffer: &mut PixelBuffer) {
        let was_live = buffer.dispose();
        if self.outstanding.remove(&buffer.id()) {
            self.released += 1;
        } else if was_live {
            debug!(id = %buffer.id(), "released untracked buffer");
        }
    }

    pub fn tracked(&self) -> usize {
        self.tracked
    }

    pub fn released(&self) -> usize {
        self.released
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}
