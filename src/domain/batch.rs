//! Integer batch scan.
//!
//! Signals are converted to `i64` buffers and processed in fixed-size
//! blocks. Within a block, the per-bar work that does not depend on the
//! carried position (exit flags, net entry) is computed first as plain
//! element-wise passes; the state walk that follows is strictly in bar order.

use crate::domain::error::SigtradeError;
use crate::domain::signal::SignalFrame;

/// Bars per block; exit flags for a block fit in one `u64` mask.
pub const BLOCK: usize = 64;

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

fn is_exact_integer(v: f64) -> bool {
    v.fract() == 0.0 && v.abs() <= MAX_EXACT
}

/// True when the frame and `init_pos` can run on the batch scan.
pub fn all_integral(frame: &SignalFrame, init_pos: f64) -> bool {
    is_exact_integer(init_pos)
        && frame
            .columns()
            .iter()
            .all(|(_, values)| values.iter().all(|&v| is_exact_integer(v)))
}

fn to_int_buffer(column: &str, values: &[f64]) -> Result<Vec<i64>, SigtradeError> {
    values
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if is_exact_integer(value) {
                Ok(value as i64)
            } else {
                Err(SigtradeError::NonIntegralSignal {
                    column: column.to_string(),
                    row,
                    value,
                })
            }
        })
        .collect()
}

/// Uncompacted positions from the integer scan. Identical to
/// [`scan_positions`](crate::domain::resolver::scan_positions) on integral
/// input.
pub fn scan_positions_batch(frame: &SignalFrame, init_pos: f64) -> Result<Vec<f64>, SigtradeError> {
    if !is_exact_integer(init_pos) {
        return Err(SigtradeError::NonIntegralSignal {
            column: "init_pos".into(),
            row: 0,
            value: init_pos,
        });
    }
    let [long_enter, long_exit, short_enter, short_exit] =
        frame.columns().map(|(name, values)| to_int_buffer(name, values));
    let (long_enter, long_exit) = (long_enter?, long_exit?);
    let (short_enter, short_exit) = (short_enter?, short_exit?);

    let n = frame.len();
    let mut out = Vec::with_capacity(n);
    let mut pos = init_pos as i64;
    let mut net = [0i64; BLOCK];

    for start in (0..n).step_by(BLOCK) {
        let end = (start + BLOCK).min(n);
        let len = end - start;

        for (slot, (le, se)) in net
            .iter_mut()
            .zip(long_enter[start..end].iter().zip(&short_enter[start..end]))
        {
            *slot = le - se;
        }
        let long_exits = exit_mask(&long_exit[start..end]);
        let short_exits = exit_mask(&short_exit[start..end]);

        for (j, &entry) in net.iter().enumerate().take(len) {
            let bit = 1u64 << j;
            let exit = (pos > 0 && long_exits & bit != 0) || (pos < 0 && short_exits & bit != 0);
            if exit {
                pos = 0;
            }
            if pos == 0 {
                pos = entry;
            }
            out.push(pos as f64);
        }
    }
    Ok(out)
}

/// Bit `j` set when `values[j]` is nonzero.
fn exit_mask(values: &[i64]) -> u64 {
    values
        .iter()
        .enumerate()
        .fold(0u64, |mask, (j, &v)| mask | (u64::from(v != 0) << j))
}
