//! Per-tenant schema provisioning.
//!
//! Tenants are isolated by PostgreSQL schema. The default (`public`) schema
//! is populated by the embedded migrations; additional tenants get the same
//! tables through [`provision_tenant`], which mirrors the migration DDL.
//! The schema name is a validated [`Tenant`] so it can be spliced into DDL
//! without quoting.

use atrium_core::tenant::Tenant;
use sqlx::PgPool;

/// Create the tenant's schema and document tables if they do not exist yet.
/// Idempotent.
pub async fn provision_tenant(pool: &PgPool, tenant: &Tenant) -> Result<(), sqlx::Error> {
    let schema = tenant.schema();
    let ddl = format!(
        "CREATE SCHEMA IF NOT EXISTS {schema};

         CREATE TABLE IF NOT EXISTS {schema}.documents (
             id               BIGSERIAL PRIMARY KEY,
             category         TEXT NOT NULL,
             title            TEXT NOT NULL,
             visibility_scope TEXT,
             status           TEXT NOT NULL DEFAULT 'PENDING_APPROVAL',
             current_version  INTEGER,
             is_delete        BOOLEAN NOT NULL DEFAULT FALSE,
             created_by       BIGINT,
             created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
             updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
         );

         CREATE INDEX IF NOT EXISTS idx_documents_status
             ON {schema}.documents (status);
         CREATE INDEX IF NOT EXISTS idx_documents_category
             ON {schema}.documents (category);

         CREATE TABLE IF NOT EXISTS {schema}.document_versions (
             id          BIGSERIAL PRIMARY KEY,
             document_id BIGINT NOT NULL REFERENCES {schema}.documents (id),
             version_no  INTEGER NOT NULL CHECK (version_no >= 1),
             file_ref    TEXT NOT NULL,
             note        TEXT,
             changed_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
             created_by  BIGINT,
             CONSTRAINT uq_document_versions_document_id_version_no
                 UNIQUE (document_id, version_no)
         );

         CREATE INDEX IF NOT EXISTS idx_document_versions_document_id
             ON {schema}.document_versions (document_id);

         CREATE TABLE IF NOT EXISTS {schema}.document_action_logs (
             id          BIGSERIAL PRIMARY KEY,
             document_id BIGINT NOT NULL REFERENCES {schema}.documents (id),
             action      TEXT NOT NULL,
             actor_id    BIGINT,
             detail      TEXT,
             action_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
         );

         CREATE INDEX IF NOT EXISTS idx_document_action_logs_document_id_action_at
             ON {schema}.document_action_logs (document_id, action_at);"
    );

    sqlx::raw_sql(&ddl).execute(pool).await?;
    tracing::debug!(tenant = %tenant, "Tenant schema provisioned");
    Ok(())
}
