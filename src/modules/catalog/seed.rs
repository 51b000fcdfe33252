//! Fixture catalog loaded after a schema reset.

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};

use super::repository;

/// Authors and their books, in insertion order.
pub const FIXTURES: &[(&str, &[&str])] = &[
    ("老王", &["老王回忆录", "我读书少，你别骗我"]),
    ("老尹", &["如何才能让自己更骚"]),
    ("老刘", &["怎样征服美丽少女", "如何征服英俊少男"]),
];

/// Insert [`FIXTURES`] in one transaction. Expects empty tables.
pub async fn load(db: &DatabaseConnection) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let mut authors = Vec::with_capacity(FIXTURES.len());
    for (author, _) in FIXTURES {
        authors.push(repository::create_author(&txn, author).await?);
    }
    for (author, (_, books)) in authors.iter().zip(FIXTURES) {
        for book in *books {
            repository::create_book(&txn, book, author.id).await?;
        }
    }

    txn.commit().await?;
    tracing::info!(authors = authors.len(), "catalog fixtures loaded");
    Ok(())
}
