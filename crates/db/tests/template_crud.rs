//! Integration tests for template CRUD and the version-guarded design
//! update, exercised against a real database.

use serde_json::json;
use sqlx::PgPool;

use slate_db::models::template::{CreateTemplate, UpdateTemplate};
use slate_db::repositories::TemplateRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_template(name: &str) -> CreateTemplate {
    CreateTemplate {
        name: name.to_string(),
        description: None,
        design_data: Some(json!({
            "canvas": { "width": 1920, "height": 1080 },
            "pages": [],
            "audioLayers": []
        })),
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_fetch_template(pool: PgPool) {
    let created = TemplateRepo::create(&pool, &new_template("Intro"))
        .await
        .unwrap();
    assert_eq!(created.name, "Intro");
    assert_eq!(created.version, 1);
    assert!(created.is_active);

    let fetched = TemplateRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.design_data, created.design_data);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_without_design_data_defaults_to_empty_object(pool: PgPool) {
    let created = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "Blank".into(),
            description: None,
            design_data: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.design_data, json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_only_active_templates(pool: PgPool) {
    let a = TemplateRepo::create(&pool, &new_template("A")).await.unwrap();
    let b = TemplateRepo::create(&pool, &new_template("B")).await.unwrap();

    assert!(TemplateRepo::deactivate(&pool, a.id).await.unwrap());

    let listed = TemplateRepo::list(&pool, 50, 0).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|t| t.id).collect();
    assert!(ids.contains(&b.id));
    assert!(!ids.contains(&a.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_metadata_does_not_bump_version(pool: PgPool) {
    let created = TemplateRepo::create(&pool, &new_template("Old name"))
        .await
        .unwrap();

    let updated = TemplateRepo::update(
        &pool,
        created.id,
        &UpdateTemplate {
            name: Some("New name".into()),
            description: Some("promo".into()),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "New name");
    assert_eq!(updated.description.as_deref(), Some("promo"));
    assert_eq!(updated.version, created.version);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_row(pool: PgPool) {
    let created = TemplateRepo::create(&pool, &new_template("Gone"))
        .await
        .unwrap();
    assert!(TemplateRepo::delete(&pool, created.id).await.unwrap());
    assert!(TemplateRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Version-guarded design update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn design_update_with_matching_version_increments(pool: PgPool) {
    let created = TemplateRepo::create(&pool, &new_template("Doc")).await.unwrap();

    let next = json!({ "canvas": { "width": 1280, "height": 720 }, "pages": [] });
    let updated = TemplateRepo::update_design(&pool, created.id, created.version, &next)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.version, created.version + 1);
    assert_eq!(updated.design_data, next);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn design_update_with_stale_version_touches_nothing(pool: PgPool) {
    let created = TemplateRepo::create(&pool, &new_template("Doc")).await.unwrap();

    // First writer wins.
    let next = json!({ "pages": [{ "id": "p1" }] });
    TemplateRepo::update_design(&pool, created.id, created.version, &next)
        .await
        .unwrap()
        .unwrap();

    // Second writer still holds the old version and must miss the guard.
    let stale = TemplateRepo::update_design(
        &pool,
        created.id,
        created.version,
        &json!({ "pages": [] }),
    )
    .await
    .unwrap();
    assert!(stale.is_none());

    let current = TemplateRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.version, created.version + 1);
    assert_eq!(current.design_data, next);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn design_update_on_missing_row_returns_none(pool: PgPool) {
    let missing = TemplateRepo::update_design(&pool, 999_999, 1, &json!({}))
        .await
        .unwrap();
    assert!(missing.is_none());
}
