//! OpenAPI component schemas for the JSON report.

use utoipa::OpenApi;

use crate::domain::{
    CoverageClass, CoverageEntry, EntryCoverage, EntryKind, FileRecord, LanguageStats,
    LibraryDeclaration, ProjectReport,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "AIGCAP coverage report", description = "Schema of the JSON export"),
    components(
        schemas(
            ProjectReport,
            FileRecord,
            LanguageStats,
            CoverageEntry,
            CoverageClass,
            EntryCoverage,
            EntryKind,
            LibraryDeclaration
        )
    )
)]
/// Schema document describing the JSON export.
pub struct ReportSchema;

/// Render the schema document as pretty JSON.
pub fn render_schema() -> Result<String, serde_json::Error> {
    ReportSchema::openapi().to_pretty_json()
}
