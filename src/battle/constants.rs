//! Battle system constants - all fixed values in one place

// Battlefield grid
pub const GRID_WIDTH: i32 = 27;
pub const GRID_HEIGHT: i32 = 21;

// Largest grid a scenario may request, in cells
pub const MAX_GRID_CELLS: i64 = 1_000_000;

// Deployment: each army occupies this many columns at its edge of the grid
pub const DEPLOYMENT_COLUMNS: i32 = 3;

// Army presets
pub const MAX_UNITS_PER_TYPE: u32 = 11;

// Playback
pub const DEFAULT_PACING_MS: u64 = 0;
