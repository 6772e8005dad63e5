#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared overlay contracts for Range Overlay adapters.
//!
//! Two logically concurrent passes meet here: the compute pass rebuilds the
//! highlighted-tile set on the simulation cadence and publishes it through
//! [`SharedTileOverlay::publish`], while the render pass reads it once per
//! frame through [`SharedTileOverlay::try_read`]. The reader never blocks
//! the writer: when the lock is contended the frame simply draws no overlay,
//! and because the writer swaps a fully staged buffer in under a single
//! acquisition, the reader can never observe a half-rebuilt set.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::{error::Error, fmt, mem};

use anyhow::Result as AnyResult;
use glam::Vec2;
use range_overlay_core::Tile;

/// Number of driver ticks between overlay recomputations.
///
/// The host driver ticks at roughly 60 Hz; recomputing every fourth tick
/// refreshes the overlay about 15 times per second.
pub const TICKS_PER_RECOMPUTE: u64 = 4;

/// Side length of one rendered tile expressed in world units.
pub const DEFAULT_TILE_LENGTH: f32 = 64.0;

/// Tint applied to highlighted tiles: white at seven tenths opacity.
pub const HIGHLIGHT_TINT: Color = Color::new(1.0, 1.0, 1.0, 0.7);

/// RGBA color used when presenting overlay frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the same color with the provided alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Clonable handle to the highlighted-tile set shared between passes.
#[derive(Clone, Debug, Default)]
pub struct SharedTileOverlay {
    tiles: Arc<Mutex<Vec<Tile>>>,
}

impl SharedTileOverlay {
    /// Creates an empty shared overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a staged tile set, replacing the previous one atomically.
    ///
    /// Blocks until the lock is available. The staged buffer is swapped in
    /// whole and handed back empty so the caller can reuse its capacity on
    /// the next pass.
    pub fn publish(&self, staged: &mut Vec<Tile>) {
        let mut published = self
            .tiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        mem::swap(&mut *published, staged);
        staged.clear();
    }

    /// Attempts to acquire the overlay for reading without blocking.
    ///
    /// Returns `None` while the compute pass holds the lock; the caller is
    /// expected to skip drawing the overlay for that frame entirely.
    #[must_use]
    pub fn try_read(&self) -> Option<OverlayReadGuard<'_>> {
        match self.tiles.try_lock() {
            Ok(guard) => Some(OverlayReadGuard { guard }),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(poisoned)) => Some(OverlayReadGuard {
                guard: poisoned.into_inner(),
            }),
        }
    }

    /// Returns a copy of the currently published tiles, blocking if needed.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Tile> {
        self.tiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Read access to the published overlay held for the duration of a draw.
#[derive(Debug)]
pub struct OverlayReadGuard<'a> {
    guard: MutexGuard<'a, Vec<Tile>>,
}

impl OverlayReadGuard<'_> {
    /// Tiles currently published for rendering.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.guard
    }
}

/// Counts driver ticks and reports when a recompute pass is due.
#[derive(Clone, Copy, Debug)]
pub struct RecomputeCadence {
    interval: u64,
    ticks: u64,
}

impl RecomputeCadence {
    /// Creates a cadence firing every `interval` ticks.
    ///
    /// A zero interval never fires, which disables recomputation without a
    /// separate flag.
    #[must_use]
    pub const fn new(interval: u64) -> Self {
        Self { interval, ticks: 0 }
    }

    /// Records one driver tick and reports whether a recompute is due.
    pub fn advance(&mut self) -> bool {
        if self.interval == 0 {
            return false;
        }
        self.ticks = self.ticks.wrapping_add(1);
        self.ticks % self.interval == 0
    }
}

impl Default for RecomputeCadence {
    fn default() -> Self {
        Self::new(TICKS_PER_RECOMPUTE)
    }
}

/// Single highlighted tile prepared for a rendering backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightInstance {
    /// Upper-left corner of the tile in world units.
    pub position: Vec2,
    /// Tint the backend should apply when drawing the highlight.
    pub tint: Color,
}

/// Describes how highlighted tiles map onto world-space draw calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayPresentation {
    tile_length: f32,
    tint: Color,
}

impl OverlayPresentation {
    /// Creates a new presentation descriptor.
    ///
    /// Returns an error when `tile_length` is not strictly positive and
    /// finite.
    pub fn new(tile_length: f32, tint: Color) -> Result<Self, PresentationError> {
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(PresentationError::InvalidTileLength { tile_length });
        }

        Ok(Self { tile_length, tint })
    }

    /// Side length of a rendered tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Tint applied to every highlight instance.
    #[must_use]
    pub const fn tint(&self) -> Color {
        self.tint
    }

    /// World-space position of the provided tile's upper-left corner.
    #[must_use]
    pub fn world_position(&self, tile: Tile) -> Vec2 {
        Vec2::new(
            tile.x() as f32 * self.tile_length,
            tile.y() as f32 * self.tile_length,
        )
    }

    /// Prepares one highlight instance per published tile.
    #[must_use]
    pub fn instances(&self, tiles: &[Tile]) -> Vec<HighlightInstance> {
        tiles
            .iter()
            .map(|tile| HighlightInstance {
                position: self.world_position(*tile),
                tint: self.tint,
            })
            .collect()
    }
}

/// Rendering backend capable of drawing prepared highlight instances.
pub trait OverlayRenderer {
    /// Draws the provided instances for the current frame.
    fn draw(&mut self, instances: &[HighlightInstance]) -> AnyResult<()>;
}

/// Runs one render pass against the shared overlay.
///
/// Returns `Ok(true)` when the overlay was drawn and `Ok(false)` when the
/// compute pass held the lock and the frame was skipped without a single
/// draw call.
pub fn render_frame<R>(
    overlay: &SharedTileOverlay,
    presentation: &OverlayPresentation,
    renderer: &mut R,
) -> AnyResult<bool>
where
    R: OverlayRenderer,
{
    let Some(guard) = overlay.try_read() else {
        return Ok(false);
    };

    let instances = presentation.instances(guard.tiles());
    renderer.draw(&instances)?;
    Ok(true)
}

/// Errors that can occur when constructing presentation descriptors.
#[derive(Debug, PartialEq)]
pub enum PresentationError {
    /// Tile length must be positive and finite to place highlights.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(
                    f,
                    "tile_length must be positive and finite (received {tile_length})"
                )
            }
        }
    }
}

impl Error for PresentationError {}
