//! Realized P&L from a trades table.
//!
//! Close points are the rows where the sign of the position changes,
//! including moves to or from flat; row 0 is always one. At each close
//! point the running notional flow minus the mark of the held position is
//! taken, and consecutive close points are differenced. The difference is
//! attributed to the later close point with its sign inverted, so a long
//! bought at 100 and sold at 110 reports +10 per unit.
//!
//! The first close point has nothing to difference against and always
//! reports zero.

use crate::domain::series::Series;
use crate::domain::trades::TradesTable;
use tracing::debug;

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Indices of rows where the position sign differs from the previous row.
pub fn close_points(position: &[f64]) -> Vec<usize> {
    let mut points = Vec::new();
    let mut prev: Option<i8> = None;
    for (i, &p) in position.iter().enumerate() {
        let s = sign(p);
        if prev != Some(s) {
            points.push(i);
        }
        prev = Some(s);
    }
    points
}

/// `cumsum(volume * price) - position * price` evaluated at each close point.
fn raw_equity_at(trades: &TradesTable, points: &[usize]) -> Vec<f64> {
    let mut cumflow = 0.0;
    let mut next = points.iter().peekable();
    let mut raw = Vec::with_capacity(points.len());
    let rows = trades
        .volume()
        .iter()
        .zip(trades.price())
        .zip(trades.position())
        .enumerate();
    for (i, ((volume, price), position)) in rows {
        cumflow += volume * price;
        if next.next_if_eq(&&i).is_some() {
            raw.push(cumflow - position * price);
        }
    }
    raw
}

/// Dense equity series on the trades index; zero except at close points.
pub fn trades_to_equity(trades: &TradesTable) -> Series {
    let points = close_points(trades.position());
    let raw = raw_equity_at(trades, &points);

    let mut values = vec![0.0; trades.len()];
    for (k, pair) in raw.windows(2).enumerate() {
        let delta = pair[1] - pair[0];
        if delta != 0.0 {
            values[points[k + 1]] = -delta;
        }
    }

    debug!(
        rows = trades.len(),
        close_points = points.len(),
        "equity derived"
    );
    Series {
        index: trades.index().to_vec(),
        values,
    }
}
