//! PostgreSQL store test: CRUD, version compare-and-swap, full-text and tag filters.
//!
//! Needs a reachable database in `DATABASE_URL`; the test returns early when it is unset.
//! Rows it creates are tagged with a unique culinary use and removed at the end.

use herb_catalog::infra::config::Config;
use herb_catalog::{
    CatalogError, CatalogService, Filters, HerbPatch, NewHerb, PostgresHerbStore, Price,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn herb(name: &str, cents: i64, uses: &[&str]) -> NewHerb {
    NewHerb {
        name: name.to_string(),
        description: format!("{} for the postgres store test", name),
        price: Price::from_cents(cents),
        culinary_uses: uses.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_store() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    if std::env::var("DATABASE_URL").map(|v| v.is_empty()).unwrap_or(true) {
        println!("DATABASE_URL not set; skipping postgres store test");
        return Ok(());
    }

    let config = Config::from_env()?;
    let database_url = std::env::var("DATABASE_URL")?;
    let store = PostgresHerbStore::connect(&database_url, &config.pool).await?;
    let catalog = CatalogService::with_timeout(Arc::new(store), config.store_timeout);

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let marker = format!("pgtest{}", nanos);

    // --- INSERT ---
    let created = catalog
        .insert(herb(
            "Acacia Powder",
            825,
            &["emulsifier", "stabilizer", "thickener", marker.as_str()],
        ))
        .await?;
    assert!(created.id > 0);
    assert_eq!(created.version, 1);
    assert_eq!(created.price.to_string(), "8.25 USD");

    let fetched = catalog.get(created.id).await?;
    assert_eq!(fetched.price, Price::from_cents(825));
    assert_eq!(
        fetched.culinary_uses,
        vec!["emulsifier", "stabilizer", "thickener", marker.as_str()]
    );

    let second = catalog
        .insert(herb("Smoked Paprika", 450, &["seasoning", marker.as_str()]))
        .await?;

    // --- LIST ---
    let tags = vec![marker.clone()];
    let found = catalog.list("acacia", &tags, &Filters::default()).await?;
    assert_eq!(found.herbs.len(), 1);
    assert_eq!(found.herbs[0].id, created.id);
    assert_eq!(found.metadata.total_records, 1);

    let found = catalog.list("Turmeric", &tags, &Filters::default()).await?;
    assert!(found.herbs.is_empty());
    assert_eq!(found.metadata.total_records, 0);
    assert_eq!(found.metadata.last_page, 0);

    let by_price = Filters {
        page: 1,
        page_size: 1,
        sort: "-price".to_string(),
    };
    let found = catalog.list("", &tags, &by_price).await?;
    assert_eq!(found.herbs.len(), 1);
    assert_eq!(found.herbs[0].id, created.id);
    assert_eq!(found.metadata.total_records, 2);
    assert_eq!(found.metadata.last_page, 2);

    // --- UPDATE: compare-and-swap ---
    let mut first = catalog.get(created.id).await?;
    let mut stale = first.clone();
    first.price = Price::from_cents(910);
    catalog.update(&mut first).await?;
    assert_eq!(first.version, 2);

    stale.name = "Gum Arabic".to_string();
    match catalog.update(&mut stale).await {
        Err(CatalogError::EditConflict) => {}
        other => panic!("expected edit conflict, got {:?}", other),
    }

    let patched = catalog
        .patch(
            created.id,
            HerbPatch {
                name: Some("Gum Arabic".to_string()),
                ..HerbPatch::default()
            },
        )
        .await?;
    assert_eq!(patched.version, 3);
    assert_eq!(patched.price, Price::from_cents(910));

    // --- DELETE ---
    catalog.delete(created.id).await?;
    assert!(matches!(
        catalog.delete(created.id).await,
        Err(CatalogError::NotFound)
    ));
    assert!(matches!(
        catalog.get(created.id).await,
        Err(CatalogError::NotFound)
    ));
    catalog.delete(second.id).await?;

    Ok(())
}
