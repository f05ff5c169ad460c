//! Content package, focus area, version snapshot, and record models.
//!
//! These rows are authored elsewhere; the feedback workflow reads them to
//! build the form a stakeholder reviews.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use keystone_core::types::{DbId, Timestamp};

/// A row from the `content_packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentPackage {
    pub id: DbId,
    pub name: String,
    pub summary: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `focus_areas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FocusArea {
    pub id: DbId,
    pub package_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A row from the `focus_area_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FocusAreaVersion {
    pub id: DbId,
    pub focus_area_id: DbId,
    pub version_number: i32,
    pub finalized_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `content_records` table.
///
/// `grid_index` is the stable identifier stakeholders answer against;
/// `display_order` only drives rendering.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentRecord {
    pub id: DbId,
    pub focus_area_version_id: DbId,
    pub display_order: i32,
    pub grid_index: i32,
    pub properties: Json<Vec<(String, String)>>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ContentRecord {
    /// The record's fields as an ordered key/value map.
    ///
    /// Later duplicates of a key overwrite earlier values but keep the
    /// first position.
    pub fn property_bag(&self) -> IndexMap<String, String> {
        self.properties.0.iter().cloned().collect()
    }
}

/// Package, focus area, and version details for one snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VersionSummary {
    pub package_id: DbId,
    pub package_name: String,
    pub package_summary: Option<String>,
    pub focus_area_id: DbId,
    pub focus_area_name: String,
    pub focus_area_version_id: DbId,
    pub version_number: i32,
}

/// DTO for creating a content package.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentPackage {
    pub name: String,
    pub summary: Option<String>,
}

/// DTO for creating a focus area.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFocusArea {
    pub package_id: DbId,
    pub name: String,
}

/// DTO for creating a content record inside a version snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentRecord {
    pub focus_area_version_id: DbId,
    pub display_order: i32,
    pub grid_index: i32,
    pub properties: Vec<(String, String)>,
}
