//! Legal melee targets: the outermost living unit of each row
//!
//! Only the edge of a formation can be reached without flanking. Dead units
//! and empty cells are transparent when looking for that edge.

use crate::battle::units::{Battlefield, Side, Unit};

/// Legal targets among `units_by_row`, at most one per row, in row order.
///
/// With `attacking_from_left` the rightmost living unit of each row is
/// taken, otherwise the leftmost. Rows are ordered left to right.
pub fn suitable_targets<'a>(
    units_by_row: &[Vec<Option<&'a Unit>>],
    attacking_from_left: bool,
) -> Vec<&'a Unit> {
    units_by_row
        .iter()
        .filter_map(|row| outermost_living(row, attacking_from_left))
        .collect()
}

fn outermost_living<'a>(row: &[Option<&'a Unit>], rightmost: bool) -> Option<&'a Unit> {
    let mut living = row.iter().flatten().copied().filter(|u| u.is_alive());
    if rightmost {
        living.last()
    } else {
        living.next()
    }
}

/// Front-line units of `defender` facing the opposing army.
///
/// The left army faces right, so its exposed units are the rightmost of each
/// row; the right army exposes its leftmost.
///
/// The flag passed on is deliberately `defender == Side::Left` rather than
/// the attacker's side: `suitable_targets` maps `true` to the rightmost unit,
/// which is the left army's front. Inverting it would aim at the rear rank.
pub fn exposed_targets(field: &Battlefield, defender: Side) -> Vec<&Unit> {
    let rows = field.rows(defender);
    suitable_targets(&rows, defender == Side::Left)
}
