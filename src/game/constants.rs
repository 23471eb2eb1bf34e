pub const DEFAULT_BOARD_SIZE: u32 = 50;
pub const DEFAULT_TICK_RATE_HZ: f64 = 10.0;
pub const DEFAULT_APPLE_COUNT: u32 = 1;
pub const MAX_PLAYERS: usize = 4;
// corner spawns sit at (1, 1) and (size - 2, size - 2)
pub const MIN_BOARD_SIZE: u32 = 4;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;
