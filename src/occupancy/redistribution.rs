// src/occupancy/redistribution.rs
//
// Display-side overflow redistribution across the physical seating columns.
//
// People never disappear here: within each column the total is conserved and
// only the displayed count moves to neighbouring tables with free seats.
// Tables outside every column pass through untouched.
//
// Per column, top to bottom:
//   1. Forward: cap each table except the last at capacity, push the excess
//      onto the next table
//   2. Backward: cap the last table, fill free seats walking upward
//   3. Whatever still does not fit goes back onto the last table, which then
//      shows the over-booking

use crate::types::SeatingColumn;

/// Room layout: tables 1-10 in one column, 11-18 in the other.
pub const DEFAULT_LAYOUT: [SeatingColumn; 2] =
    [SeatingColumn::new(1, 10), SeatingColumn::new(11, 18)];

pub fn redistribute_overflow(counts: &[u32], capacity: i32, layout: &[SeatingColumn]) -> Vec<u32> {
    if capacity <= 0 {
        return counts.to_vec();
    }
    let cap = capacity as u64;
    let mut work: Vec<u64> = counts.iter().map(|&c| c as u64).collect();

    for column in layout {
        if column.first == 0 || column.first > column.last {
            continue;
        }
        let start = column.first - 1;
        let end = column.last.min(work.len());
        if start >= end {
            continue;
        }
        redistribute_column(&mut work[start..end], cap);
    }

    work.into_iter()
        .map(|c| u32::try_from(c).unwrap_or(u32::MAX))
        .collect()
}

fn redistribute_column(column: &mut [u64], cap: u64) {
    let Some(last) = column.len().checked_sub(1) else {
        return;
    };

    for i in 0..last {
        if column[i] > cap {
            let excess = column[i] - cap;
            column[i] = cap;
            column[i + 1] += excess;
        }
    }

    if column[last] <= cap {
        return;
    }
    let mut overflow = column[last] - cap;
    column[last] = cap;
    for i in (0..last).rev() {
        if overflow == 0 {
            break;
        }
        let give = cap.saturating_sub(column[i]).min(overflow);
        column[i] += give;
        overflow -= give;
    }
    column[last] += overflow;
}
