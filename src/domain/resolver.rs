//! Signal-to-position resolution.
//!
//! A single left-to-right scan carries one state value, the current
//! position, through the bars. At each bar:
//!
//! 1. An open long is flattened when `long_exit` fires; an open short is
//!    flattened when `short_exit` fires. Exits while flat do nothing.
//! 2. If the position is flat after step 1 (including a flatten on this very
//!    bar), it becomes `long_enter - short_enter`. Simultaneous long and short
//!    entries therefore net out arithmetically.
//! 3. Otherwise the position carries over unchanged.
//!
//! The dense result is compacted to the bars where the position changed.

use crate::domain::batch;
use crate::domain::error::SigtradeError;
use crate::domain::series::Series;
use crate::domain::signal::SignalFrame;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Which scan implementation a [`Resolver`] runs.
///
/// Both implementations produce identical positions for integral inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanBackend {
    /// Batch when every input is integral, scalar otherwise.
    #[default]
    Auto,
    /// Reference `f64` loop.
    Scalar,
    /// Block-wise `i64` scan; rejects non-integral inputs.
    Batch,
}

impl FromStr for ScanBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ScanBackend::Auto),
            "scalar" => Ok(ScanBackend::Scalar),
            "batch" => Ok(ScanBackend::Batch),
            other => Err(format!(
                "unknown backend '{other}' (expected auto, scalar or batch)"
            )),
        }
    }
}

impl fmt::Display for ScanBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanBackend::Auto => "auto",
            ScanBackend::Scalar => "scalar",
            ScanBackend::Batch => "batch",
        };
        f.write_str(name)
    }
}

/// One bar of the state machine.
#[inline]
pub(crate) fn step(pos: f64, long_enter: f64, long_exit: f64, short_enter: f64, short_exit: f64) -> f64 {
    let exit_long = pos > 0.0 && long_exit != 0.0;
    let exit_short = pos < 0.0 && short_exit != 0.0;
    let pos = if exit_long || exit_short { 0.0 } else { pos };
    if pos == 0.0 {
        long_enter - short_enter
    } else {
        pos
    }
}

/// Uncompacted positions, one per bar, from the reference scalar scan.
pub fn scan_positions(frame: &SignalFrame, init_pos: f64) -> Vec<f64> {
    let mut pos = init_pos;
    let mut out = Vec::with_capacity(frame.len());
    let [long_enter, long_exit, short_enter, short_exit] = frame.columns().map(|(_, v)| v);
    for i in 0..frame.len() {
        pos = step(pos, long_enter[i], long_exit[i], short_enter[i], short_exit[i]);
        out.push(pos);
    }
    out
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    backend: ScanBackend,
}

impl Resolver {
    pub fn new(backend: ScanBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> ScanBackend {
        self.backend
    }

    /// Dense position series over the frame's index.
    ///
    /// `init_pos` seeds the first bar's transition. In live use it must
    /// reflect the position actually held; a wrong value silently shifts
    /// every subsequent bar.
    pub fn scan(&self, frame: &SignalFrame, init_pos: f64) -> Result<Series, SigtradeError> {
        if !init_pos.is_finite() {
            return Err(SigtradeError::InvalidInitialPosition { value: init_pos });
        }
        if init_pos != 0.0 {
            warn!(init_pos, "scan seeded with a nonzero initial position");
        }

        let values = match self.backend {
            ScanBackend::Scalar => scan_positions(frame, init_pos),
            ScanBackend::Batch => batch::scan_positions_batch(frame, init_pos)?,
            ScanBackend::Auto => {
                if batch::all_integral(frame, init_pos) {
                    debug!(bars = frame.len(), "auto backend: batch");
                    batch::scan_positions_batch(frame, init_pos)?
                } else {
                    debug!(bars = frame.len(), "auto backend: scalar");
                    scan_positions(frame, init_pos)
                }
            }
        };
        Series::new(frame.index().to_vec(), values)
    }

    /// Position series compacted to the bars where the position changed.
    pub fn resolve(&self, frame: &SignalFrame, init_pos: f64) -> Result<Series, SigtradeError> {
        let compacted = self.scan(frame, init_pos)?.compact();
        debug!(
            bars = frame.len(),
            changes = compacted.len(),
            backend = %self.backend,
            "positions resolved"
        );
        Ok(compacted)
    }
}

/// Compacted positions using the default backend.
pub fn resolve_positions(frame: &SignalFrame, init_pos: f64) -> Result<Series, SigtradeError> {
    Resolver::default().resolve(frame, init_pos)
}
