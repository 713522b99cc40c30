//! The catalog's relational data model (spec §3).
//!
//! Rows are addressed by their 64-bit integer id; there are no in-memory
//! pointers between rows (spec §9, "Cyclic graph of foreign keys"). These
//! types exist for decoding query rows into named fields and for
//! `--pipe`/JSON presentation — the database itself remains the source of
//! truth.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Reserved entity id for the "default" entity (spec §3, GLOSSARY).
pub const DEFAULT_ENTITY_ID: i64 = 0;

/// `entity.type` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum EntityType {
    None = 0,
    Normal = 1,
    Full = 2,
    Incremental = 3,
    Differential = 4,
    Continuous = 5,
}

impl EntityType {
    pub fn from_i32(v: i32) -> Result<Self> {
        Ok(match v {
            0 => Self::None,
            1 => Self::Normal,
            2 => Self::Full,
            3 => Self::Incremental,
            4 => Self::Differential,
            5 => Self::Continuous,
            other => {
                return Err(Error::Constraint(format!(
                    "entity.type {other} out of declared range 0..=5"
                )))
            }
        })
    }
}

/// `entry.type` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum EntryType {
    Any = 0,
    File = 1,
    Image = 2,
    Directory = 3,
    Link = 4,
    Hardlink = 5,
    Special = 6,
}

impl EntryType {
    pub fn from_i32(v: i32) -> Result<Self> {
        Ok(match v {
            0 => Self::Any,
            1 => Self::File,
            2 => Self::Image,
            3 => Self::Directory,
            4 => Self::Link,
            5 => Self::Hardlink,
            6 => Self::Special,
            other => {
                return Err(Error::Constraint(format!(
                    "entry.type {other} out of declared range 0..=6"
                )))
            }
        })
    }

    /// Types whose entries are backed by `entryFragments` rather than a
    /// storage-direct type-row (spec §3, Ownership).
    #[must_use]
    pub const fn is_fragmented(self) -> bool {
        matches!(self, Self::File | Self::Image | Self::Hardlink)
    }

    /// The six concrete entry types the aggregator sums over (spec §4.6).
    pub const CONCRETE: [EntryType; 6] = [
        EntryType::File,
        EntryType::Image,
        EntryType::Directory,
        EntryType::Link,
        EntryType::Hardlink,
        EntryType::Special,
    ];

    /// Lowercase column-name fragment used to build `total_<xxx>_count`
    /// style identifiers.
    #[must_use]
    pub const fn column_fragment(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::File => "file",
            Self::Image => "image",
            Self::Directory => "directory",
            Self::Link => "link",
            Self::Hardlink => "hardlink",
            Self::Special => "special",
        }
    }
}

/// `storage.state` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum StorageState {
    None = 0,
    Ok = 1,
    Create = 2,
    UpdateRequested = 3,
    Update = 4,
    Error = 5,
}

impl StorageState {
    pub fn from_i32(v: i32) -> Result<Self> {
        Ok(match v {
            0 => Self::None,
            1 => Self::Ok,
            2 => Self::Create,
            3 => Self::UpdateRequested,
            4 => Self::Update,
            5 => Self::Error,
            other => {
                return Err(Error::Constraint(format!(
                    "storage.state {other} out of declared range 0..=5"
                )))
            }
        })
    }

    /// Highest valid ordinal, used by the Cleaner/Integrity Checker to spot
    /// out-of-range values (spec §4.4, §4.7).
    pub const MAX_ORDINAL: i32 = 5;
}

/// `storage.mode` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum StorageMode {
    Manual = 0,
    Auto = 1,
}

impl StorageMode {
    pub fn from_i32(v: i32) -> Result<Self> {
        Ok(match v {
            0 => Self::Manual,
            1 => Self::Auto,
            other => {
                return Err(Error::Constraint(format!(
                    "storage.mode {other} out of declared range 0..=1"
                )))
            }
        })
    }
}

/// The 22 aggregate counters carried on both `entity` and `storage` rows
/// (spec §4.6): six counts + three sizes + count/size rollups, computed
/// twice — once over all live entries, once over `entryNewest` only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Aggregates {
    pub total_file_count: i64,
    pub total_image_count: i64,
    pub total_directory_count: i64,
    pub total_link_count: i64,
    pub total_hardlink_count: i64,
    pub total_special_count: i64,
    pub total_file_size: i64,
    pub total_image_size: i64,
    pub total_hardlink_size: i64,
    pub total_entry_count: i64,
    pub total_entry_size: i64,

    pub total_file_count_newest: i64,
    pub total_image_count_newest: i64,
    pub total_directory_count_newest: i64,
    pub total_link_count_newest: i64,
    pub total_hardlink_count_newest: i64,
    pub total_special_count_newest: i64,
    pub total_file_size_newest: i64,
    pub total_image_size_newest: i64,
    pub total_hardlink_size_newest: i64,
    pub total_entry_count_newest: i64,
    pub total_entry_size_newest: i64,
}

impl Aggregates {
    /// Recompute the two rollups from the underlying per-type columns.
    /// Invoked by the Aggregator after filling in the per-type fields.
    pub fn roll_up(&mut self) {
        self.total_entry_count = self.total_file_count
            + self.total_image_count
            + self.total_directory_count
            + self.total_link_count
            + self.total_hardlink_count
            + self.total_special_count;
        self.total_entry_size = self.total_file_size + self.total_image_size + self.total_hardlink_size;

        self.total_entry_count_newest = self.total_file_count_newest
            + self.total_image_count_newest
            + self.total_directory_count_newest
            + self.total_link_count_newest
            + self.total_hardlink_count_newest
            + self.total_special_count_newest;
        self.total_entry_size_newest =
            self.total_file_size_newest + self.total_image_size_newest + self.total_hardlink_size_newest;
    }
}

/// A `uuid` row: one per backup job identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UuidRow {
    pub id: i64,
    pub job_uuid: String,
}

/// An `entity` row: one backup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub uuid_id: i64,
    pub job_uuid: String,
    pub entity_type: EntityType,
    pub schedule_uuid: Option<String>,
    pub created: i64,
    pub locked_count: i64,
    pub deleted_flag: bool,
    pub aggregates: Aggregates,
}

/// A `storage` row: one archive file produced by a backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    pub id: i64,
    pub uuid_id: i64,
    pub entity_id: i64,
    pub name: String,
    pub created: i64,
    pub host_name: Option<String>,
    pub user_name: Option<String>,
    pub comment: Option<String>,
    pub state: StorageState,
    pub mode: StorageMode,
    pub last_checked: Option<i64>,
    pub error_message: Option<String>,
    pub deleted_flag: bool,
    pub aggregates: Aggregates,
}

/// An `entry` row: one backed-up filesystem object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub uuid_id: i64,
    pub entity_id: i64,
    pub entry_type: EntryType,
    pub name: String,
    pub time_last_changed: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub permission: i64,
    pub size: i64,
    pub deleted_flag: bool,
}

/// An `entryFragment` row: a byte range of a file/image/hardlink entry
/// residing in one storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFragment {
    pub id: i64,
    pub storage_id: i64,
    pub entry_id: i64,
    pub offset: i64,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_round_trips_concrete_set() {
        for t in EntryType::CONCRETE {
            let back = EntryType::from_i32(t as i32).unwrap();
            assert_eq!(back as i32, t as i32);
        }
    }

    #[test]
    fn entity_type_rejects_out_of_range() {
        assert!(EntityType::from_i32(99).is_err());
    }

    #[test]
    fn storage_state_rejects_out_of_range() {
        assert!(StorageState::from_i32(6).is_err());
        assert!(StorageState::from_i32(StorageState::MAX_ORDINAL).is_ok());
    }

    #[test]
    fn aggregates_roll_up_sums_per_type_columns() {
        let mut agg = Aggregates {
            total_file_count: 3,
            total_image_count: 1,
            total_directory_count: 2,
            total_file_size: 1024,
            total_image_size: 2048,
            ..Default::default()
        };
        agg.roll_up();
        assert_eq!(agg.total_entry_count, 6);
        assert_eq!(agg.total_entry_size, 3072);
        assert_eq!(agg.total_entry_count_newest, 0);
    }
}
