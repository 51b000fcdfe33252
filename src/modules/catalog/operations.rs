//! Request-level catalog operations. Each one is a single all-or-nothing
//! transaction: on any storage error nothing it wrote survives.

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use thiserror::Error;

use super::{
    form::NewBook,
    models::{author, book},
    repository,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    AuthorAndBookCreated {
        author: author::Model,
        book: book::Model,
    },
    BookCreated(book::Model),
    /// The title is already in the catalog, possibly under another author.
    BookAlreadyExists(book::Model),
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("malformed identifier '{0}'")]
    MalformedId(String),
    #[error("lookup failed: {0}")]
    Lookup(#[source] DbErr),
    #[error("record does not exist")]
    NotFound,
    #[error("deletion failed: {0}")]
    Mutation(#[source] DbErr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedAuthor {
    pub author: author::Model,
    pub books_removed: u64,
}

/// Add `new_book`, creating its author first when the name is unknown.
pub async fn add_book(db: &DatabaseConnection, new_book: &NewBook) -> Result<AddOutcome, DbErr> {
    let txn = db.begin().await?;

    match add_book_in(&txn, new_book).await {
        Ok(outcome) => {
            txn.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            rollback(txn).await;
            Err(e)
        }
    }
}

async fn add_book_in(txn: &DatabaseTransaction, new_book: &NewBook) -> Result<AddOutcome, DbErr> {
    let Some(author) = repository::find_author_by_name(txn, &new_book.author).await? else {
        let author = repository::create_author(txn, &new_book.author).await?;
        let book = repository::create_book(txn, &new_book.book, author.id).await?;
        return Ok(AddOutcome::AuthorAndBookCreated { author, book });
    };

    if let Some(existing) = repository::find_book_by_name(txn, &new_book.book).await? {
        return Ok(AddOutcome::BookAlreadyExists(existing));
    }

    let book = repository::create_book(txn, &new_book.book, author.id).await?;
    Ok(AddOutcome::BookCreated(book))
}

/// Delete an author and, first, every book that references it.
pub async fn delete_author(
    db: &DatabaseConnection,
    raw_id: &str,
) -> Result<RemovedAuthor, DeleteError> {
    let id = parse_id(raw_id)?;
    let author = repository::find_author_by_id(db, id)
        .await
        .map_err(DeleteError::Lookup)?
        .ok_or(DeleteError::NotFound)?;

    let txn = db.begin().await.map_err(DeleteError::Mutation)?;
    let removed = async {
        let books_removed = repository::delete_books_by_author(&txn, author.id).await?;
        repository::delete_author(&txn, author.clone()).await?;
        Ok::<_, DbErr>(books_removed)
    }
    .await;

    match removed {
        Ok(books_removed) => {
            txn.commit().await.map_err(DeleteError::Mutation)?;
            Ok(RemovedAuthor {
                author,
                books_removed,
            })
        }
        Err(e) => {
            rollback(txn).await;
            Err(DeleteError::Mutation(e))
        }
    }
}

pub async fn delete_book(
    db: &DatabaseConnection,
    raw_id: &str,
) -> Result<book::Model, DeleteError> {
    let id = parse_id(raw_id)?;
    let book = repository::find_book_by_id(db, id)
        .await
        .map_err(DeleteError::Lookup)?
        .ok_or(DeleteError::NotFound)?;

    let txn = db.begin().await.map_err(DeleteError::Mutation)?;
    match repository::delete_book(&txn, book.clone()).await {
        Ok(()) => {
            txn.commit().await.map_err(DeleteError::Mutation)?;
            Ok(book)
        }
        Err(e) => {
            rollback(txn).await;
            Err(DeleteError::Mutation(e))
        }
    }
}

fn parse_id(raw_id: &str) -> Result<i32, DeleteError> {
    raw_id
        .trim()
        .parse()
        .map_err(|_| DeleteError::MalformedId(raw_id.to_string()))
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!(error = %e, "transaction rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::test_support::{row_counts, seeded_catalog, unmigrated_store};
    use sea_orm::ConnectionTrait;

    fn new_book(author: &str, book: &str) -> NewBook {
        NewBook {
            author: author.to_string(),
            book: book.to_string(),
        }
    }

    #[tokio::test]
    async fn new_author_gets_author_and_book_rows() {
        let db = seeded_catalog().await;

        let outcome = add_book(&db, &new_book("老张", "张三日记")).await.unwrap();
        let AddOutcome::AuthorAndBookCreated { author, book } = outcome else {
            panic!("expected author and book to be created, got {outcome:?}");
        };
        assert_eq!(book.author_id, author.id);
        assert_eq!(row_counts(&db).await, (4, 6));
    }

    #[tokio::test]
    async fn existing_author_only_gains_a_book() {
        let db = seeded_catalog().await;

        let outcome = add_book(&db, &new_book("老王", "新书")).await.unwrap();
        let AddOutcome::BookCreated(book) = outcome else {
            panic!("expected book to be created, got {outcome:?}");
        };
        assert_eq!(book.author_id, 1);
        assert_eq!(row_counts(&db).await, (3, 6));
    }

    #[tokio::test]
    async fn duplicate_title_under_any_author_is_refused() {
        let db = seeded_catalog().await;

        let outcome = add_book(&db, &new_book("老刘", "老王回忆录")).await.unwrap();
        assert!(matches!(outcome, AddOutcome::BookAlreadyExists(ref b) if b.author_id == 1));
        assert_eq!(row_counts(&db).await, (3, 5));
    }

    #[tokio::test]
    async fn failed_book_insert_discards_new_author() {
        let db = seeded_catalog().await;

        // The author is new, so the title check is skipped and the insert
        // trips the unique constraint after the author row was written.
        let result = add_book(&db, &new_book("老张", "老王回忆录")).await;
        assert!(result.is_err());
        assert_eq!(row_counts(&db).await, (3, 5));
        assert!(repository::find_author_by_name(&db, "老张")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn failed_insert_for_existing_author_changes_nothing() {
        let db = seeded_catalog().await;
        db.execute_unprepared(
            "CREATE TRIGGER books_frozen BEFORE INSERT ON books \
             BEGIN SELECT RAISE(ABORT, 'no new books'); END;",
        )
        .await
        .unwrap();

        assert!(add_book(&db, &new_book("老王", "新书")).await.is_err());
        assert_eq!(row_counts(&db).await, (3, 5));
        assert!(repository::find_book_by_name(&db, "新书")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unreadable_store_is_a_lookup_failure() {
        let db = unmigrated_store().await;

        assert!(matches!(
            delete_author(&db, "1").await,
            Err(DeleteError::Lookup(_))
        ));
        assert!(matches!(
            delete_book(&db, "1").await,
            Err(DeleteError::Lookup(_))
        ));
    }

    #[tokio::test]
    async fn deleting_author_removes_only_their_books() {
        let db = seeded_catalog().await;

        let removed = delete_author(&db, "1").await.unwrap();
        assert_eq!(removed.author.name, "老王");
        assert_eq!(removed.books_removed, 2);
        assert_eq!(row_counts(&db).await, (2, 3));

        let listing = repository::list_all_authors(&db).await.unwrap();
        assert!(listing.iter().all(|l| l.author.id != 1));
        assert!(listing.iter().flat_map(|l| &l.books).all(|b| b.author_id != 1));
    }

    #[tokio::test]
    async fn deleting_author_rolls_back_on_failure() {
        let db = seeded_catalog().await;
        db.execute_unprepared(
            "CREATE TRIGGER author_locked BEFORE DELETE ON author \
             BEGIN SELECT RAISE(ABORT, 'author rows are locked'); END;",
        )
        .await
        .unwrap();

        let err = delete_author(&db, "1").await.unwrap_err();
        assert!(matches!(err, DeleteError::Mutation(_)));
        // The books were deleted before the author delete failed.
        assert_eq!(row_counts(&db).await, (3, 5));
    }

    #[tokio::test]
    async fn deleting_author_reports_lookup_problems() {
        let db = seeded_catalog().await;

        assert!(matches!(
            delete_author(&db, "abc").await,
            Err(DeleteError::MalformedId(raw)) if raw == "abc"
        ));
        assert!(matches!(
            delete_author(&db, "42").await,
            Err(DeleteError::NotFound)
        ));
        assert_eq!(row_counts(&db).await, (3, 5));
    }

    #[tokio::test]
    async fn deleting_book_removes_one_row() {
        let db = seeded_catalog().await;

        let book = delete_book(&db, "3").await.unwrap();
        assert_eq!(book.name, "如何才能让自己更骚");
        assert_eq!(row_counts(&db).await, (3, 4));
    }

    #[tokio::test]
    async fn deleting_missing_book_changes_nothing() {
        let db = seeded_catalog().await;

        assert!(matches!(
            delete_book(&db, "999").await,
            Err(DeleteError::NotFound)
        ));
        assert_eq!(row_counts(&db).await, (3, 5));
    }

    #[tokio::test]
    async fn deleting_book_rolls_back_on_failure() {
        let db = seeded_catalog().await;
        db.execute_unprepared(
            "CREATE TRIGGER books_locked BEFORE DELETE ON books \
             BEGIN SELECT RAISE(ABORT, 'book rows are locked'); END;",
        )
        .await
        .unwrap();

        assert!(matches!(
            delete_book(&db, "1").await,
            Err(DeleteError::Mutation(_))
        ));
        assert_eq!(row_counts(&db).await, (3, 5));
    }
}
