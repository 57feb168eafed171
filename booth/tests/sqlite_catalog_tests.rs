use sqlx::SqlitePool;

use booth::catalog::BoothCatalog;
use booth::catalog::sqlite_catalog::SqliteBoothCatalog;
use booth::types::BoothId;

#[sqlx::test]
async fn seed_creates_standard_booths(pool: SqlitePool) -> anyhow::Result<()> {
    let catalog = SqliteBoothCatalog::from_pool(pool);
    catalog.migrate().await?;
    catalog.seed_if_empty().await?;

    let all = catalog.all().await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id.as_str(), "cabina1");
    assert_eq!(all[1].id.as_str(), "cabina2");
    assert!(all.iter().all(|b| b.hourly_price_cents == 50_00));
    assert!(all.iter().all(|b| b.active));

    Ok(())
}

#[sqlx::test]
async fn seed_is_idempotent(pool: SqlitePool) -> anyhow::Result<()> {
    let catalog = SqliteBoothCatalog::from_pool(pool);
    catalog.migrate().await?;

    catalog.seed_if_empty().await?;
    catalog.seed_if_empty().await?;

    assert_eq!(catalog.all().await?.len(), 2);

    Ok(())
}

#[sqlx::test]
async fn fetch_restores_feature_list(pool: SqlitePool) -> anyhow::Result<()> {
    let catalog = SqliteBoothCatalog::from_pool(pool);
    catalog.migrate().await?;
    catalog.seed_if_empty().await?;

    let booth = catalog
        .fetch(&BoothId::new("cabina1"))
        .await?
        .expect("seeded booth missing");

    assert_eq!(booth.name, "Cabina 1");
    assert_eq!(booth.features.len(), 2);

    Ok(())
}

#[sqlx::test]
async fn fetch_unknown_returns_none(pool: SqlitePool) -> anyhow::Result<()> {
    let catalog = SqliteBoothCatalog::from_pool(pool);
    catalog.migrate().await?;

    assert!(catalog.fetch(&BoothId::new("nope")).await?.is_none());

    Ok(())
}
