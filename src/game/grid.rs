use super::constants::MAX_PLACEMENT_ATTEMPTS;
use super::snake::Player;
use super::types::Cell;
use rand::Rng;

pub fn in_bounds(size: u32, cell: Cell) -> bool {
  let side = size as i32;
  cell.0 >= 0 && cell.1 >= 0 && cell.0 < side && cell.1 < side
}

/// A cell is free when no snake occupies it. Every body is scanned, dead or
/// alive: placement can happen before a death is finalized within a tick.
pub fn is_free(players: &[Player], cell: Cell) -> bool {
  players.iter().all(|player| !player.body.contains(&cell))
}

/// Picks a uniformly random free cell: a bounded number of samples first,
/// then a full scan. `None` means the board is saturated.
pub fn random_free_cell<R: Rng>(rng: &mut R, size: u32, players: &[Player]) -> Option<Cell> {
  let side = size as i32;
  if side <= 0 {
    return None;
  }
  for _ in 0..MAX_PLACEMENT_ATTEMPTS {
    let cell = Cell(rng.gen_range(0..side), rng.gen_range(0..side));
    if is_free(players, cell) {
      return Some(cell);
    }
  }
  let free: Vec<Cell> = (0..side)
    .flat_map(|x| (0..side).map(move |y| Cell(x, y)))
    .filter(|cell| is_free(players, *cell))
    .collect();
  if free.is_empty() {
    None
  } else {
    Some(free[rng.gen_range(0..free.len())])
  }
}
