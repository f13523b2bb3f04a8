pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS kv_store (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Upgrades applied to databases older than `CURRENT_VERSION`, as
/// `(from_version, sql)` taking version N to N+1. Empty while the
/// `kv_store` layout is still at version 1; the next layout change adds
/// its entry here and bumps `CURRENT_VERSION`.
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
