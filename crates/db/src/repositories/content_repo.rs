//! Repositories for content packages, focus areas, version snapshots, and
//! content records.
//!
//! The feedback workflow only reads these tables. The insert helpers exist
//! for the authoring side and for seeding test fixtures.

use sqlx::types::Json;
use sqlx::PgPool;
use keystone_core::types::DbId;

use crate::models::content::{
    ContentPackage, ContentRecord, CreateContentPackage, CreateContentRecord, CreateFocusArea,
    FocusArea, FocusAreaVersion, VersionSummary,
};

/// Column list for content_packages queries.
const PACKAGE_COLUMNS: &str = "id, name, summary, created_at";

/// Column list for focus_areas queries.
const FOCUS_AREA_COLUMNS: &str = "id, package_id, name, created_at";

/// Column list for focus_area_versions queries.
const VERSION_COLUMNS: &str = "id, focus_area_id, version_number, finalized_at, created_at";

/// Column list for content_records queries.
const RECORD_COLUMNS: &str = "id, focus_area_version_id, display_order, grid_index, \
    properties, deleted_at, created_at";

/// Provides CRUD operations for content packages.
pub struct ContentPackageRepo;

impl ContentPackageRepo {
    /// Insert a new package, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContentPackage,
    ) -> Result<ContentPackage, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_packages (name, summary)
             VALUES ($1, $2)
             RETURNING {PACKAGE_COLUMNS}"
        );
        sqlx::query_as::<_, ContentPackage>(&query)
            .bind(&input.name)
            .bind(&input.summary)
            .fetch_one(pool)
            .await
    }

    /// Find a package by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContentPackage>, sqlx::Error> {
        let query = format!("SELECT {PACKAGE_COLUMNS} FROM content_packages WHERE id = $1");
        sqlx::query_as::<_, ContentPackage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides CRUD operations for focus areas.
pub struct FocusAreaRepo;

impl FocusAreaRepo {
    /// Insert a new focus area, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFocusArea) -> Result<FocusArea, sqlx::Error> {
        let query = format!(
            "INSERT INTO focus_areas (package_id, name)
             VALUES ($1, $2)
             RETURNING {FOCUS_AREA_COLUMNS}"
        );
        sqlx::query_as::<_, FocusArea>(&query)
            .bind(input.package_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }
}

/// Provides version-snapshot operations for focus areas.
pub struct FocusAreaVersionRepo;

impl FocusAreaVersionRepo {
    /// Insert a new version snapshot, auto-assigning the next version number.
    pub async fn create(
        pool: &PgPool,
        focus_area_id: DbId,
    ) -> Result<FocusAreaVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO focus_area_versions (focus_area_id, version_number)
             VALUES (
                $1,
                (SELECT COALESCE(MAX(version_number), 0) + 1 FROM focus_area_versions WHERE focus_area_id = $1)
             )
             RETURNING {VERSION_COLUMNS}"
        );
        sqlx::query_as::<_, FocusAreaVersion>(&query)
            .bind(focus_area_id)
            .fetch_one(pool)
            .await
    }

    /// Freeze a version snapshot. Returns `true` if the version was open.
    pub async fn finalize(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE focus_area_versions SET finalized_at = NOW() \
             WHERE id = $1 AND finalized_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load the package, focus area, and version details of a snapshot.
    pub async fn find_summary(
        pool: &PgPool,
        version_id: DbId,
    ) -> Result<Option<VersionSummary>, sqlx::Error> {
        sqlx::query_as::<_, VersionSummary>(
            "SELECT
                p.id AS package_id,
                p.name AS package_name,
                p.summary AS package_summary,
                fa.id AS focus_area_id,
                fa.name AS focus_area_name,
                v.id AS focus_area_version_id,
                v.version_number
             FROM focus_area_versions v
             JOIN focus_areas fa ON fa.id = v.focus_area_id
             JOIN content_packages p ON p.id = fa.package_id
             WHERE v.id = $1",
        )
        .bind(version_id)
        .fetch_optional(pool)
        .await
    }
}

/// Provides read and seed operations for content records.
pub struct ContentRecordRepo;

impl ContentRecordRepo {
    /// Insert a record into a version snapshot, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContentRecord,
    ) -> Result<ContentRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_records
                (focus_area_version_id, display_order, grid_index, properties)
             VALUES ($1, $2, $3, $4)
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, ContentRecord>(&query)
            .bind(input.focus_area_version_id)
            .bind(input.display_order)
            .bind(input.grid_index)
            .bind(Json(&input.properties))
            .fetch_one(pool)
            .await
    }

    /// List the live records of a version, ordered by display order.
    ///
    /// When `grid_filter` is non-empty only records whose grid index appears
    /// in it are returned. Soft-deleted records are always excluded.
    pub async fn list_for_version(
        pool: &PgPool,
        version_id: DbId,
        grid_filter: &[i32],
    ) -> Result<Vec<ContentRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM content_records
             WHERE focus_area_version_id = $1
               AND deleted_at IS NULL
               AND (cardinality($2::int4[]) = 0 OR grid_index = ANY($2::int4[]))
             ORDER BY display_order ASC, grid_index ASC"
        );
        sqlx::query_as::<_, ContentRecord>(&query)
            .bind(version_id)
            .bind(grid_filter)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a record. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_records SET deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
