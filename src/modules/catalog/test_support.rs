use bookshelf_kernel::settings::DatabaseSettings;
use sea_orm::{DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait};

use super::{models, seed, CatalogModule};
use bookshelf_kernel::Module;

/// In-memory store without any tables, so every catalog query fails.
pub(crate) async fn unmigrated_store() -> DatabaseConnection {
    bookshelf_db::connect(&DatabaseSettings::in_memory())
        .await
        .unwrap()
}

/// Fresh in-memory store with the catalog tables and no rows.
pub(crate) async fn empty_catalog() -> DatabaseConnection {
    let db = bookshelf_db::connect(&DatabaseSettings::in_memory())
        .await
        .unwrap();
    let module = CatalogModule::new(db.clone());
    let tables = module.schema(&sea_orm::Schema::new(DbBackend::Sqlite));
    bookshelf_db::install_schema(&db, &tables, true).await.unwrap();
    db
}

/// In-memory store holding the fixture catalog (authors 1..=3, five books).
pub(crate) async fn seeded_catalog() -> DatabaseConnection {
    let db = empty_catalog().await;
    seed::load(&db).await.unwrap();
    db
}

pub(crate) async fn row_counts(db: &DatabaseConnection) -> (u64, u64) {
    let authors = models::author::Entity::find().count(db).await.unwrap();
    let books = models::book::Entity::find().count(db).await.unwrap();
    (authors, books)
}
