//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY CHECK(length(id) >= 1 AND length(id) <= 64),
    display_name TEXT CHECK(display_name IS NULL OR length(display_name) <= 100),
    is_manager INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 2. Record sources (must be before dashboard_lines due to FK)
-- =============================================================================
CREATE TABLE IF NOT EXISTS sources (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE CHECK(length(name) >= 1 AND length(name) <= 100),
    label TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS source_fields (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    label TEXT NOT NULL,
    field_type TEXT NOT NULL CHECK(field_type IN ('text', 'numeric', 'boolean', 'date')),
    digits INTEGER,
    position INTEGER NOT NULL DEFAULT 0,
    UNIQUE(source_id, name)
);

CREATE INDEX IF NOT EXISTS idx_source_fields_source ON source_fields(source_id, position);

-- Record values as a JSON object keyed by field name
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    data TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_source ON records(source_id);

-- =============================================================================
-- 3. Dashboards
-- =============================================================================
CREATE TABLE IF NOT EXISTS dashboards (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Render settings stored as JSON (display mode, group-bys, measures, flags)
CREATE TABLE IF NOT EXISTS dashboard_lines (
    id TEXT PRIMARY KEY,
    dashboard_id TEXT NOT NULL REFERENCES dashboards(id) ON DELETE CASCADE,
    source_id TEXT NOT NULL REFERENCES sources(id),
    name TEXT NOT NULL,
    width INTEGER NOT NULL DEFAULT 6 CHECK(width >= 1 AND width <= 12),
    height INTEGER NOT NULL DEFAULT 400,
    position INTEGER NOT NULL DEFAULT 0,
    settings TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_dashboard_lines_dashboard ON dashboard_lines(dashboard_id, position);

-- Typed filter inputs declared per dashboard
CREATE TABLE IF NOT EXISTS filter_fields (
    id TEXT PRIMARY KEY,
    dashboard_id TEXT NOT NULL REFERENCES dashboards(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    field_name TEXT NOT NULL,
    field_type TEXT NOT NULL CHECK(field_type IN ('text', 'numeric', 'boolean', 'date')),
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_filter_fields_dashboard ON filter_fields(dashboard_id, position);

-- =============================================================================
-- 4. Saved per-user filter inputs
-- =============================================================================
CREATE TABLE IF NOT EXISTS saved_filters (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    dashboard_id TEXT NOT NULL REFERENCES dashboards(id) ON DELETE CASCADE,
    filter_field_id TEXT NOT NULL REFERENCES filter_fields(id) ON DELETE CASCADE,
    raw_input TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, filter_field_id)
);

CREATE INDEX IF NOT EXISTS idx_saved_filters_user_dashboard ON saved_filters(user_id, dashboard_id);
"#;
