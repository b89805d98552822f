//! Integration tests for the filtered document listing:
//! - title/category/scope filters and pagination
//! - status filter groupings used by the admin screens
//! - display version selection (approved version vs. latest submission)

use assert_matches::assert_matches;
use sqlx::PgPool;

use atrium_core::document::DocumentAction;
use atrium_core::error::CoreError;
use atrium_core::tenant::Tenant;
use atrium_db::models::document::{CreateDocument, DocumentQuery};
use atrium_db::models::document_version::SubmitVersion;
use atrium_db::repositories::DocumentRepo;
use atrium_db::{DocumentWorkflow, WorkflowError};

fn new_document(title: &str, category: &str, scope: &str) -> CreateDocument {
    CreateDocument {
        category: category.to_string(),
        title: title.to_string(),
        visibility_scope: Some(scope.to_string()),
        file_ref: format!("blob:{}", title.to_lowercase().replace(' ', "-")),
        note: None,
        created_by: Some(1),
    }
}

async fn create(pool: &PgPool, tenant: &Tenant, title: &str, category: &str, scope: &str) -> i64 {
    let (doc, _) = DocumentWorkflow::create(pool, tenant, &new_document(title, category, scope))
        .await
        .unwrap();
    doc.id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_filters(pool: PgPool) {
    let tenant = Tenant::public();
    create(&pool, &tenant, "House Rules", "POLICY", "PUBLIC").await;
    create(&pool, &tenant, "Parking Rules", "POLICY", "RESIDENT").await;
    create(&pool, &tenant, "Monthly Invoice Guide", "FINANCE", "ACCOUNTING").await;

    // No filter: everything.
    let page = DocumentRepo::search(&pool, &tenant, &DocumentQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);

    // Title substring, case-insensitive.
    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            title: Some("rules".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 2);

    // Category.
    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            category: Some("FINANCE".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Monthly Invoice Guide");

    // Visibility scope.
    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            visibility_scope: Some("RESIDENT".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Parking Rules");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_pagination(pool: PgPool) {
    let tenant = Tenant::public();
    for n in 1..=5 {
        create(&pool, &tenant, &format!("Document {n:02}"), "POLICY", "PUBLIC").await;
    }

    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            limit: Some(2),
            offset: Some(0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 5, "total counts all matches, not the page");
    assert_eq!(page.items.len(), 2);

    let rest = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            limit: Some(10),
            offset: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(rest.items.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_filter_groupings(pool: PgPool) {
    let tenant = Tenant::public();

    // pending: freshly created.
    create(&pool, &tenant, "Pending Doc", "POLICY", "PUBLIC").await;

    // pending-delete: active with a delete request, grouped under pending.
    let id = create(&pool, &tenant, "Doomed Doc", "POLICY", "PUBLIC").await;
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Approve, Some(2), None)
        .await
        .unwrap();
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::RequestDelete, Some(3), None)
        .await
        .unwrap();

    // inactive.
    let id = create(&pool, &tenant, "Retired Doc", "POLICY", "PUBLIC").await;
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Approve, Some(2), None)
        .await
        .unwrap();
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Deactivate, Some(2), None)
        .await
        .unwrap();

    // PENDING_APPROVAL matches PENDING_DELETE too.
    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            status: Some("PENDING_APPROVAL".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let titles: Vec<&str> = page.items.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(page.total, 2);
    assert!(titles.contains(&"Pending Doc"));
    assert!(titles.contains(&"Doomed Doc"));

    // INACTIVE matches only the retired one here.
    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            status: Some("inactive".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Retired Doc");

    // Unknown status is a validation error, not an empty page.
    assert_matches!(
        DocumentRepo::search(
            &pool,
            &tenant,
            &DocumentQuery {
                status: Some("LIMBO".to_string()),
                ..Default::default()
            },
        )
        .await,
        Err(WorkflowError::Core(CoreError::Validation(_)))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_shows_display_version(pool: PgPool) {
    let tenant = Tenant::public();
    let id = create(&pool, &tenant, "Versioned Doc", "POLICY", "PUBLIC").await;

    // Before any approval the latest submission is shown.
    let page = DocumentRepo::search(&pool, &tenant, &DocumentQuery::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].latest_version_no, 1);
    assert_eq!(page.items[0].file_ref, "blob:versioned-doc");

    // Approve v1, then submit v2: the approved file stays the display
    // version while v2 awaits review.
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Approve, Some(2), None)
        .await
        .unwrap();
    DocumentWorkflow::submit_version(
        &pool,
        &tenant,
        id,
        &SubmitVersion {
            file_ref: "blob:v2".to_string(),
            note: None,
            created_by: Some(1),
        },
        Some(1),
    )
    .await
    .unwrap();

    let page = DocumentRepo::search(&pool, &tenant, &DocumentQuery::default())
        .await
        .unwrap();
    let row = &page.items[0];
    assert_eq!(row.current_version, Some(1));
    assert_eq!(row.latest_version_no, 2);
    assert_eq!(row.file_ref, "blob:versioned-doc", "approved file is shown");

    // After the next approval the display version moves to v2.
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Approve, Some(2), None)
        .await
        .unwrap();
    let page = DocumentRepo::search(&pool, &tenant, &DocumentQuery::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].file_ref, "blob:v2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_include_deleted_toggle(pool: PgPool) {
    let tenant = Tenant::public();
    let id = create(&pool, &tenant, "Trashed Doc", "POLICY", "PUBLIC").await;
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Approve, Some(2), None)
        .await
        .unwrap();
    DocumentWorkflow::change_status(&pool, &tenant, id, DocumentAction::Deactivate, Some(2), None)
        .await
        .unwrap();
    DocumentWorkflow::soft_delete(&pool, &tenant, id, Some(2), None)
        .await
        .unwrap();

    let page = DocumentRepo::search(&pool, &tenant, &DocumentQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let page = DocumentRepo::search(
        &pool,
        &tenant,
        &DocumentQuery {
            include_deleted: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items[0].is_delete);
}
