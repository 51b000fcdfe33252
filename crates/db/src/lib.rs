//! Connection factory and schema installation for the SQL store.

use std::time::Duration;

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use sea_orm::{
    sea_query::{Table, TableCreateStatement},
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
};

/// Open a pooled connection described by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    tracing::debug!(target: "bookshelf-db", url = %settings.url, "opening database");

    let mut opt = ConnectOptions::new(settings.url.clone());
    opt.max_connections(settings.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .with_context(|| format!("failed to open database: {}", settings.url))?;

    tracing::info!(
        target: "bookshelf-db",
        backend = ?db.get_database_backend(),
        "database connection ready"
    );
    Ok(db)
}

/// Create `tables` in order.
///
/// With `reset` every table is dropped first, children before parents, so the
/// store ends up empty. Without it existing tables are left untouched.
pub async fn install_schema(
    db: &DatabaseConnection,
    tables: &[TableCreateStatement],
    reset: bool,
) -> anyhow::Result<()> {
    let backend = db.get_database_backend();

    if reset {
        for table in tables.iter().rev() {
            let Some(name) = table.get_table_name() else {
                continue;
            };
            let drop = Table::drop().table(name.clone()).if_exists().to_owned();
            db.execute(backend.build(&drop))
                .await
                .with_context(|| "failed to drop table")?;
        }
        tracing::info!(target: "bookshelf-db", tables = tables.len(), "dropped schema");
    }

    for table in tables {
        let mut create = table.clone();
        if !reset {
            create.if_not_exists();
        }
        db.execute(backend.build(&create))
            .await
            .with_context(|| "failed to create table")?;
    }

    tracing::info!(target: "bookshelf-db", tables = tables.len(), reset, "schema installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{
        sea_query::{Alias, ColumnDef, ForeignKey},
        DbBackend, Statement,
    };

    fn tables() -> Vec<TableCreateStatement> {
        vec![
            Table::create()
                .table(Alias::new("shelf"))
                .col(
                    ColumnDef::new(Alias::new("id"))
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .to_owned(),
            Table::create()
                .table(Alias::new("volume"))
                .col(
                    ColumnDef::new(Alias::new("id"))
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(Alias::new("shelf_id")).integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .from(Alias::new("volume"), Alias::new("shelf_id"))
                        .to(Alias::new("shelf"), Alias::new("id")),
                )
                .to_owned(),
        ]
    }

    async fn count(db: &DatabaseConnection, table: &str) -> i64 {
        let row = db
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                format!("SELECT COUNT(*) AS n FROM {table}"),
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get::<i64>("", "n").unwrap()
    }

    #[tokio::test]
    async fn install_is_idempotent_without_reset() {
        let db = connect(&DatabaseSettings::in_memory()).await.unwrap();
        install_schema(&db, &tables(), false).await.unwrap();
        db.execute_unprepared("INSERT INTO shelf (id) VALUES (1)")
            .await
            .unwrap();

        install_schema(&db, &tables(), false).await.unwrap();
        assert_eq!(count(&db, "shelf").await, 1);
    }

    #[tokio::test]
    async fn reset_drops_children_before_parents() {
        let db = connect(&DatabaseSettings::in_memory()).await.unwrap();
        install_schema(&db, &tables(), false).await.unwrap();
        db.execute_unprepared("INSERT INTO shelf (id) VALUES (1)")
            .await
            .unwrap();
        db.execute_unprepared("INSERT INTO volume (shelf_id) VALUES (1)")
            .await
            .unwrap();

        install_schema(&db, &tables(), true).await.unwrap();
        assert_eq!(count(&db, "shelf").await, 0);
        assert_eq!(count(&db, "volume").await, 0);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = connect(&DatabaseSettings::in_memory()).await.unwrap();
        install_schema(&db, &tables(), false).await.unwrap();

        let dangling = db
            .execute_unprepared("INSERT INTO volume (shelf_id) VALUES (42)")
            .await;
        assert!(dangling.is_err());
    }
}
