//! Project-wide constants.

/// Environment variable that overrides the compiled engine binary path.
pub const ENGINE_PATH_ENV: &str = "RECKONER_ENGINE";

/// Default location of the compiled engine binary (container image layout).
pub const DEFAULT_ENGINE_PATH: &str = "./engine/bin/finengine";

/// Default wall-clock limit for a single engine invocation.
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 30;

/// Default cap on concurrent engine processes.
pub const DEFAULT_MAX_ENGINE_PROCESSES: usize = 8;

/// Default SQLite database path for calculation history.
pub const DEFAULT_DB: &str = "reckoner.db";

/// Coupon periods per year assumed when a bond request omits the frequency.
pub const DEFAULT_BOND_FREQUENCY: f64 = 2.0;
