//! Per-dialect DDL text (spec §4.1, §3 data model).
//!
//! Table/index/trigger definitions live here as plain string tables, in the
//! teacher's `SCHEMA_SQL` style (`storage/schema.rs`) — one big, readable SQL
//! constant per dialect rather than a query-builder abstraction.

/// Names of every base table, in foreign-key-safe creation order (referenced
/// tables before their dependents). Drops run in reverse.
pub const TABLE_NAMES: &[&str] = &[
    "meta",
    "uuids",
    "entities",
    "storages",
    "entries",
    "entryFragments",
    "fileEntries",
    "imageEntries",
    "hardlinkEntries",
    "directoryEntries",
    "linkEntries",
    "specialEntries",
    "entryNewest",
    "skippedEntries",
];

pub const VIEW_NAMES: &[&str] = &[];

pub const INDEX_NAMES: &[&str] = &[
    "indexEntitiesUuidId",
    "indexStoragesEntityId",
    "indexStoragesUuidId",
    "indexEntriesEntityId",
    "indexEntriesName",
    "indexEntryFragmentsStorageId",
    "indexEntryFragmentsEntryId",
    "indexEntryNewestName",
];

pub const TRIGGER_NAMES: &[&str] = &["trgEntitiesTouch", "trgStoragesTouch"];

pub mod sqlite {
    pub const CREATE_TABLES: &str = "\
CREATE TABLE IF NOT EXISTS meta (
    name TEXT PRIMARY KEY,
    value TEXT
);
CREATE TABLE IF NOT EXISTS uuids (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    jobUuid TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuidId INTEGER NOT NULL REFERENCES uuids(id),
    jobUuid TEXT NOT NULL,
    type INTEGER NOT NULL DEFAULT 0,
    scheduleUuid TEXT,
    created INTEGER NOT NULL,
    lockedCount INTEGER NOT NULL DEFAULT 0,
    deletedFlag INTEGER NOT NULL DEFAULT 0,
    totalFileCount INTEGER NOT NULL DEFAULT 0,
    totalImageCount INTEGER NOT NULL DEFAULT 0,
    totalDirectoryCount INTEGER NOT NULL DEFAULT 0,
    totalLinkCount INTEGER NOT NULL DEFAULT 0,
    totalHardlinkCount INTEGER NOT NULL DEFAULT 0,
    totalSpecialCount INTEGER NOT NULL DEFAULT 0,
    totalFileSize INTEGER NOT NULL DEFAULT 0,
    totalImageSize INTEGER NOT NULL DEFAULT 0,
    totalHardlinkSize INTEGER NOT NULL DEFAULT 0,
    totalEntryCount INTEGER NOT NULL DEFAULT 0,
    totalEntrySize INTEGER NOT NULL DEFAULT 0,
    totalFileCountNewest INTEGER NOT NULL DEFAULT 0,
    totalImageCountNewest INTEGER NOT NULL DEFAULT 0,
    totalDirectoryCountNewest INTEGER NOT NULL DEFAULT 0,
    totalLinkCountNewest INTEGER NOT NULL DEFAULT 0,
    totalHardlinkCountNewest INTEGER NOT NULL DEFAULT 0,
    totalSpecialCountNewest INTEGER NOT NULL DEFAULT 0,
    totalFileSizeNewest INTEGER NOT NULL DEFAULT 0,
    totalImageSizeNewest INTEGER NOT NULL DEFAULT 0,
    totalHardlinkSizeNewest INTEGER NOT NULL DEFAULT 0,
    totalEntryCountNewest INTEGER NOT NULL DEFAULT 0,
    totalEntrySizeNewest INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS storages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuidId INTEGER NOT NULL REFERENCES uuids(id),
    entityId INTEGER NOT NULL REFERENCES entities(id),
    name TEXT,
    created INTEGER NOT NULL,
    hostName TEXT,
    userName TEXT,
    comment TEXT,
    state INTEGER NOT NULL DEFAULT 0 CHECK (state BETWEEN 0 AND 5),
    mode INTEGER NOT NULL DEFAULT 0,
    lastChecked INTEGER,
    errorMessage TEXT,
    deletedFlag INTEGER NOT NULL DEFAULT 0,
    totalFileCount INTEGER NOT NULL DEFAULT 0,
    totalImageCount INTEGER NOT NULL DEFAULT 0,
    totalDirectoryCount INTEGER NOT NULL DEFAULT 0,
    totalLinkCount INTEGER NOT NULL DEFAULT 0,
    totalHardlinkCount INTEGER NOT NULL DEFAULT 0,
    totalSpecialCount INTEGER NOT NULL DEFAULT 0,
    totalFileSize INTEGER NOT NULL DEFAULT 0,
    totalImageSize INTEGER NOT NULL DEFAULT 0,
    totalHardlinkSize INTEGER NOT NULL DEFAULT 0,
    totalEntryCount INTEGER NOT NULL DEFAULT 0,
    totalEntrySize INTEGER NOT NULL DEFAULT 0,
    totalFileCountNewest INTEGER NOT NULL DEFAULT 0,
    totalImageCountNewest INTEGER NOT NULL DEFAULT 0,
    totalDirectoryCountNewest INTEGER NOT NULL DEFAULT 0,
    totalLinkCountNewest INTEGER NOT NULL DEFAULT 0,
    totalHardlinkCountNewest INTEGER NOT NULL DEFAULT 0,
    totalSpecialCountNewest INTEGER NOT NULL DEFAULT 0,
    totalFileSizeNewest INTEGER NOT NULL DEFAULT 0,
    totalImageSizeNewest INTEGER NOT NULL DEFAULT 0,
    totalHardlinkSizeNewest INTEGER NOT NULL DEFAULT 0,
    totalEntryCountNewest INTEGER NOT NULL DEFAULT 0,
    totalEntrySizeNewest INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuidId INTEGER NOT NULL,
    entityId INTEGER NOT NULL REFERENCES entities(id),
    type INTEGER NOT NULL CHECK (type BETWEEN 0 AND 6),
    name TEXT NOT NULL,
    timeLastChanged INTEGER NOT NULL,
    userId INTEGER NOT NULL DEFAULT 0,
    groupId INTEGER NOT NULL DEFAULT 0,
    permission INTEGER NOT NULL DEFAULT 0,
    size INTEGER NOT NULL DEFAULT 0,
    deletedFlag INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS entryFragments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    storageId INTEGER NOT NULL REFERENCES storages(id),
    entryId INTEGER NOT NULL REFERENCES entries(id),
    offset INTEGER NOT NULL,
    size INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS fileEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entryId INTEGER NOT NULL UNIQUE REFERENCES entries(id),
    size INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS imageEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entryId INTEGER NOT NULL UNIQUE REFERENCES entries(id),
    size INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS hardlinkEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entryId INTEGER NOT NULL UNIQUE REFERENCES entries(id),
    size INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS directoryEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    storageId INTEGER NOT NULL REFERENCES storages(id),
    entryId INTEGER NOT NULL UNIQUE REFERENCES entries(id)
);
CREATE TABLE IF NOT EXISTS linkEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    storageId INTEGER NOT NULL REFERENCES storages(id),
    entryId INTEGER NOT NULL UNIQUE REFERENCES entries(id)
);
CREATE TABLE IF NOT EXISTS specialEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    storageId INTEGER NOT NULL REFERENCES storages(id),
    entryId INTEGER NOT NULL UNIQUE REFERENCES entries(id)
);
CREATE TABLE IF NOT EXISTS entryNewest (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuidId INTEGER NOT NULL,
    entityId INTEGER NOT NULL,
    entryId INTEGER NOT NULL,
    type INTEGER NOT NULL,
    name TEXT NOT NULL UNIQUE,
    timeLastChanged INTEGER NOT NULL,
    userId INTEGER NOT NULL DEFAULT 0,
    groupId INTEGER NOT NULL DEFAULT 0,
    permission INTEGER NOT NULL DEFAULT 0,
    size INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS skippedEntries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entityId INTEGER NOT NULL REFERENCES entities(id),
    storageId INTEGER REFERENCES storages(id),
    name TEXT NOT NULL,
    reason TEXT
);
";

    pub const CREATE_INDICES: &str = "\
CREATE INDEX IF NOT EXISTS indexEntitiesUuidId ON entities(uuidId);
CREATE INDEX IF NOT EXISTS indexStoragesEntityId ON storages(entityId);
CREATE INDEX IF NOT EXISTS indexStoragesUuidId ON storages(uuidId);
CREATE INDEX IF NOT EXISTS indexEntriesEntityId ON entries(entityId);
CREATE INDEX IF NOT EXISTS indexEntriesName ON entries(name);
CREATE INDEX IF NOT EXISTS indexEntryFragmentsStorageId ON entryFragments(storageId);
CREATE INDEX IF NOT EXISTS indexEntryFragmentsEntryId ON entryFragments(entryId);
CREATE INDEX IF NOT EXISTS indexEntryNewestName ON entryNewest(name);
";

    pub const CREATE_TRIGGERS: &str = "\
CREATE TRIGGER IF NOT EXISTS trgEntitiesTouch
    AFTER UPDATE ON entities
    BEGIN
        SELECT 1;
    END;
CREATE TRIGGER IF NOT EXISTS trgStoragesTouch
    AFTER UPDATE ON storages
    BEGIN
        SELECT 1;
    END;
";
}

/// MariaDB and PostgreSQL differ from the embedded dialect only in the
/// autoincrement/serial spelling and the boolean column type; the statements
/// here are split one-per-entry because client/server DDL must run outside a
/// transaction, one statement at a time (spec §5).
pub mod mariadb {
    pub const CREATE_TABLES: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS meta (name VARCHAR(64) PRIMARY KEY, value TEXT)",
        "CREATE TABLE IF NOT EXISTS uuids (id BIGINT PRIMARY KEY AUTO_INCREMENT, jobUuid VARCHAR(64) NOT NULL UNIQUE)",
        "CREATE TABLE IF NOT EXISTS entities (\
            id BIGINT PRIMARY KEY AUTO_INCREMENT, uuidId BIGINT NOT NULL, jobUuid VARCHAR(64) NOT NULL, \
            type INT NOT NULL DEFAULT 0, scheduleUuid VARCHAR(64), created BIGINT NOT NULL, \
            lockedCount BIGINT NOT NULL DEFAULT 0, deletedFlag TINYINT NOT NULL DEFAULT 0, \
            totalFileCount BIGINT NOT NULL DEFAULT 0, totalImageCount BIGINT NOT NULL DEFAULT 0, \
            totalDirectoryCount BIGINT NOT NULL DEFAULT 0, totalLinkCount BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkCount BIGINT NOT NULL DEFAULT 0, totalSpecialCount BIGINT NOT NULL DEFAULT 0, \
            totalFileSize BIGINT NOT NULL DEFAULT 0, totalImageSize BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkSize BIGINT NOT NULL DEFAULT 0, totalEntryCount BIGINT NOT NULL DEFAULT 0, \
            totalEntrySize BIGINT NOT NULL DEFAULT 0, totalFileCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageCountNewest BIGINT NOT NULL DEFAULT 0, totalDirectoryCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalLinkCountNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalSpecialCountNewest BIGINT NOT NULL DEFAULT 0, totalFileSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageSizeNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalEntryCountNewest BIGINT NOT NULL DEFAULT 0, totalEntrySizeNewest BIGINT NOT NULL DEFAULT 0, \
            FOREIGN KEY (uuidId) REFERENCES uuids(id))",
        "CREATE TABLE IF NOT EXISTS storages (\
            id BIGINT PRIMARY KEY AUTO_INCREMENT, uuidId BIGINT NOT NULL, entityId BIGINT NOT NULL, \
            name VARCHAR(4096), created BIGINT NOT NULL, hostName VARCHAR(256), userName VARCHAR(256), \
            comment TEXT, state INT NOT NULL DEFAULT 0, mode INT NOT NULL DEFAULT 0, lastChecked BIGINT, \
            errorMessage TEXT, deletedFlag TINYINT NOT NULL DEFAULT 0, \
            totalFileCount BIGINT NOT NULL DEFAULT 0, totalImageCount BIGINT NOT NULL DEFAULT 0, \
            totalDirectoryCount BIGINT NOT NULL DEFAULT 0, totalLinkCount BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkCount BIGINT NOT NULL DEFAULT 0, totalSpecialCount BIGINT NOT NULL DEFAULT 0, \
            totalFileSize BIGINT NOT NULL DEFAULT 0, totalImageSize BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkSize BIGINT NOT NULL DEFAULT 0, totalEntryCount BIGINT NOT NULL DEFAULT 0, \
            totalEntrySize BIGINT NOT NULL DEFAULT 0, totalFileCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageCountNewest BIGINT NOT NULL DEFAULT 0, totalDirectoryCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalLinkCountNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalSpecialCountNewest BIGINT NOT NULL DEFAULT 0, totalFileSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageSizeNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalEntryCountNewest BIGINT NOT NULL DEFAULT 0, totalEntrySizeNewest BIGINT NOT NULL DEFAULT 0, \
            FOREIGN KEY (uuidId) REFERENCES uuids(id), FOREIGN KEY (entityId) REFERENCES entities(id))",
        "CREATE TABLE IF NOT EXISTS entries (\
            id BIGINT PRIMARY KEY AUTO_INCREMENT, uuidId BIGINT NOT NULL, entityId BIGINT NOT NULL, \
            type INT NOT NULL, name VARCHAR(4096) NOT NULL, timeLastChanged BIGINT NOT NULL, \
            userId BIGINT NOT NULL DEFAULT 0, groupId BIGINT NOT NULL DEFAULT 0, \
            permission BIGINT NOT NULL DEFAULT 0, size BIGINT NOT NULL DEFAULT 0, \
            deletedFlag TINYINT NOT NULL DEFAULT 0, \
            FOREIGN KEY (entityId) REFERENCES entities(id))",
        "CREATE TABLE IF NOT EXISTS entryFragments (\
            id BIGINT PRIMARY KEY AUTO_INCREMENT, storageId BIGINT NOT NULL, entryId BIGINT NOT NULL, \
            offset BIGINT NOT NULL, size BIGINT NOT NULL, \
            FOREIGN KEY (storageId) REFERENCES storages(id), FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS fileEntries (id BIGINT PRIMARY KEY AUTO_INCREMENT, entryId BIGINT NOT NULL UNIQUE, size BIGINT NOT NULL, FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS imageEntries (id BIGINT PRIMARY KEY AUTO_INCREMENT, entryId BIGINT NOT NULL UNIQUE, size BIGINT NOT NULL, FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS hardlinkEntries (id BIGINT PRIMARY KEY AUTO_INCREMENT, entryId BIGINT NOT NULL UNIQUE, size BIGINT NOT NULL, FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS directoryEntries (id BIGINT PRIMARY KEY AUTO_INCREMENT, storageId BIGINT NOT NULL, entryId BIGINT NOT NULL UNIQUE, FOREIGN KEY (storageId) REFERENCES storages(id), FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS linkEntries (id BIGINT PRIMARY KEY AUTO_INCREMENT, storageId BIGINT NOT NULL, entryId BIGINT NOT NULL UNIQUE, FOREIGN KEY (storageId) REFERENCES storages(id), FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS specialEntries (id BIGINT PRIMARY KEY AUTO_INCREMENT, storageId BIGINT NOT NULL, entryId BIGINT NOT NULL UNIQUE, FOREIGN KEY (storageId) REFERENCES storages(id), FOREIGN KEY (entryId) REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS entryNewest (\
            id BIGINT PRIMARY KEY AUTO_INCREMENT, uuidId BIGINT NOT NULL, entityId BIGINT NOT NULL, \
            entryId BIGINT NOT NULL, type INT NOT NULL, name VARCHAR(4096) NOT NULL UNIQUE, \
            timeLastChanged BIGINT NOT NULL, userId BIGINT NOT NULL DEFAULT 0, \
            groupId BIGINT NOT NULL DEFAULT 0, permission BIGINT NOT NULL DEFAULT 0, size BIGINT NOT NULL DEFAULT 0)",
        "CREATE TABLE IF NOT EXISTS skippedEntries (\
            id BIGINT PRIMARY KEY AUTO_INCREMENT, entityId BIGINT NOT NULL, storageId BIGINT, \
            name VARCHAR(4096) NOT NULL, reason TEXT, \
            FOREIGN KEY (entityId) REFERENCES entities(id), FOREIGN KEY (storageId) REFERENCES storages(id))",
    ];

    /// Index creation is a no-op on client/server backends (spec §4.1:
    /// "indices are declared in the table DDL" — the `UNIQUE`/`FOREIGN KEY`
    /// clauses above already create the backing indices MariaDB needs).
    pub const CREATE_INDICES: &[&str] = &[];

    pub const CREATE_TRIGGERS: &[&str] = &[
        "CREATE TRIGGER IF NOT EXISTS trgEntitiesTouch AFTER UPDATE ON entities FOR EACH ROW BEGIN END",
        "CREATE TRIGGER IF NOT EXISTS trgStoragesTouch AFTER UPDATE ON storages FOR EACH ROW BEGIN END",
    ];
}

pub mod postgres {
    pub const CREATE_TABLES: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS meta (name TEXT PRIMARY KEY, value TEXT)",
        "CREATE TABLE IF NOT EXISTS uuids (id BIGSERIAL PRIMARY KEY, jobUuid TEXT NOT NULL UNIQUE)",
        "CREATE TABLE IF NOT EXISTS entities (\
            id BIGSERIAL PRIMARY KEY, uuidId BIGINT NOT NULL REFERENCES uuids(id), jobUuid TEXT NOT NULL, \
            type INT NOT NULL DEFAULT 0, scheduleUuid TEXT, created BIGINT NOT NULL, \
            lockedCount BIGINT NOT NULL DEFAULT 0, deletedFlag BOOLEAN NOT NULL DEFAULT FALSE, \
            totalFileCount BIGINT NOT NULL DEFAULT 0, totalImageCount BIGINT NOT NULL DEFAULT 0, \
            totalDirectoryCount BIGINT NOT NULL DEFAULT 0, totalLinkCount BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkCount BIGINT NOT NULL DEFAULT 0, totalSpecialCount BIGINT NOT NULL DEFAULT 0, \
            totalFileSize BIGINT NOT NULL DEFAULT 0, totalImageSize BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkSize BIGINT NOT NULL DEFAULT 0, totalEntryCount BIGINT NOT NULL DEFAULT 0, \
            totalEntrySize BIGINT NOT NULL DEFAULT 0, totalFileCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageCountNewest BIGINT NOT NULL DEFAULT 0, totalDirectoryCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalLinkCountNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalSpecialCountNewest BIGINT NOT NULL DEFAULT 0, totalFileSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageSizeNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalEntryCountNewest BIGINT NOT NULL DEFAULT 0, totalEntrySizeNewest BIGINT NOT NULL DEFAULT 0)",
        "CREATE TABLE IF NOT EXISTS storages (\
            id BIGSERIAL PRIMARY KEY, uuidId BIGINT NOT NULL REFERENCES uuids(id), \
            entityId BIGINT NOT NULL REFERENCES entities(id), name TEXT, created BIGINT NOT NULL, \
            hostName TEXT, userName TEXT, comment TEXT, state INT NOT NULL DEFAULT 0, \
            mode INT NOT NULL DEFAULT 0, lastChecked BIGINT, errorMessage TEXT, \
            deletedFlag BOOLEAN NOT NULL DEFAULT FALSE, \
            totalFileCount BIGINT NOT NULL DEFAULT 0, totalImageCount BIGINT NOT NULL DEFAULT 0, \
            totalDirectoryCount BIGINT NOT NULL DEFAULT 0, totalLinkCount BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkCount BIGINT NOT NULL DEFAULT 0, totalSpecialCount BIGINT NOT NULL DEFAULT 0, \
            totalFileSize BIGINT NOT NULL DEFAULT 0, totalImageSize BIGINT NOT NULL DEFAULT 0, \
            totalHardlinkSize BIGINT NOT NULL DEFAULT 0, totalEntryCount BIGINT NOT NULL DEFAULT 0, \
            totalEntrySize BIGINT NOT NULL DEFAULT 0, totalFileCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageCountNewest BIGINT NOT NULL DEFAULT 0, totalDirectoryCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalLinkCountNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkCountNewest BIGINT NOT NULL DEFAULT 0, \
            totalSpecialCountNewest BIGINT NOT NULL DEFAULT 0, totalFileSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalImageSizeNewest BIGINT NOT NULL DEFAULT 0, totalHardlinkSizeNewest BIGINT NOT NULL DEFAULT 0, \
            totalEntryCountNewest BIGINT NOT NULL DEFAULT 0, totalEntrySizeNewest BIGINT NOT NULL DEFAULT 0)",
        "CREATE TABLE IF NOT EXISTS entries (\
            id BIGSERIAL PRIMARY KEY, uuidId BIGINT NOT NULL, entityId BIGINT NOT NULL REFERENCES entities(id), \
            type INT NOT NULL, name TEXT NOT NULL, timeLastChanged BIGINT NOT NULL, \
            userId BIGINT NOT NULL DEFAULT 0, groupId BIGINT NOT NULL DEFAULT 0, \
            permission BIGINT NOT NULL DEFAULT 0, size BIGINT NOT NULL DEFAULT 0, \
            deletedFlag BOOLEAN NOT NULL DEFAULT FALSE)",
        "CREATE TABLE IF NOT EXISTS entryFragments (\
            id BIGSERIAL PRIMARY KEY, storageId BIGINT NOT NULL REFERENCES storages(id), \
            entryId BIGINT NOT NULL REFERENCES entries(id), offset BIGINT NOT NULL, size BIGINT NOT NULL)",
        "CREATE TABLE IF NOT EXISTS fileEntries (id BIGSERIAL PRIMARY KEY, entryId BIGINT NOT NULL UNIQUE REFERENCES entries(id), size BIGINT NOT NULL)",
        "CREATE TABLE IF NOT EXISTS imageEntries (id BIGSERIAL PRIMARY KEY, entryId BIGINT NOT NULL UNIQUE REFERENCES entries(id), size BIGINT NOT NULL)",
        "CREATE TABLE IF NOT EXISTS hardlinkEntries (id BIGSERIAL PRIMARY KEY, entryId BIGINT NOT NULL UNIQUE REFERENCES entries(id), size BIGINT NOT NULL)",
        "CREATE TABLE IF NOT EXISTS directoryEntries (id BIGSERIAL PRIMARY KEY, storageId BIGINT NOT NULL REFERENCES storages(id), entryId BIGINT NOT NULL UNIQUE REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS linkEntries (id BIGSERIAL PRIMARY KEY, storageId BIGINT NOT NULL REFERENCES storages(id), entryId BIGINT NOT NULL UNIQUE REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS specialEntries (id BIGSERIAL PRIMARY KEY, storageId BIGINT NOT NULL REFERENCES storages(id), entryId BIGINT NOT NULL UNIQUE REFERENCES entries(id))",
        "CREATE TABLE IF NOT EXISTS entryNewest (\
            id BIGSERIAL PRIMARY KEY, uuidId BIGINT NOT NULL, entityId BIGINT NOT NULL, entryId BIGINT NOT NULL, \
            type INT NOT NULL, name TEXT NOT NULL UNIQUE, timeLastChanged BIGINT NOT NULL, \
            userId BIGINT NOT NULL DEFAULT 0, groupId BIGINT NOT NULL DEFAULT 0, \
            permission BIGINT NOT NULL DEFAULT 0, size BIGINT NOT NULL DEFAULT 0)",
        "CREATE TABLE IF NOT EXISTS skippedEntries (\
            id BIGSERIAL PRIMARY KEY, entityId BIGINT NOT NULL REFERENCES entities(id), \
            storageId BIGINT REFERENCES storages(id), name TEXT NOT NULL, reason TEXT)",
    ];

    /// No-op: PostgreSQL indices here ride on `UNIQUE`/`REFERENCES` clauses
    /// in the table DDL (spec §4.1).
    pub const CREATE_INDICES: &[&str] = &[];

    pub const CREATE_TRIGGERS: &[&str] = &[];
}
