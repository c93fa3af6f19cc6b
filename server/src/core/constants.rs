// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Tabord";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "tabord";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".tabord";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tabord.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TABORD_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "TABORD_DEBUG";

/// Environment variable for server host
pub const ENV_HOST: &str = "TABORD_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "TABORD_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TABORD_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "TABORD_DATA_DIR";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5617;

/// Default request body limit in bytes (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "tabord.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL autocheckpoint (pages)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval between forced WAL checkpoints in seconds
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Shutdown
// =============================================================================

/// Max seconds to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Dashboard Limits
// =============================================================================

/// Max length of one raw filter input string
pub const MAX_FILTER_INPUT_LEN: usize = 500;

/// Max rows returned in a list widget payload
pub const MAX_LIST_ROWS: usize = 1000;

/// Max records accepted in one ingestion request
pub const MAX_RECORDS_PER_REQUEST: usize = 10_000;

/// Default grid width of a dashboard line (Bootstrap-style 12-column grid)
pub const DEFAULT_LINE_WIDTH: u8 = 6;

/// Default height of a dashboard line in pixels
pub const DEFAULT_LINE_HEIGHT: u16 = 400;
