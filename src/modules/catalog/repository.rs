//! Queries and mutations against the author and book tables.
//!
//! Every function takes any [`ConnectionTrait`], so the same calls run on the
//! pool or inside a [`sea_orm::DatabaseTransaction`]. Lookups report
//! `Ok(None)` for a missing row and `Err` only for storage failures.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder,
};

use super::models::{author, book};

/// An author together with the books that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorListing {
    pub author: author::Model,
    pub books: Vec<book::Model>,
}

pub async fn find_author_by_id<C>(db: &C, id: i32) -> Result<Option<author::Model>, DbErr>
where
    C: ConnectionTrait,
{
    author::Entity::find_by_id(id).one(db).await
}

pub async fn find_author_by_name<C>(db: &C, name: &str) -> Result<Option<author::Model>, DbErr>
where
    C: ConnectionTrait,
{
    author::Entity::find()
        .filter(author::Column::Name.eq(name))
        .one(db)
        .await
}

pub async fn find_book_by_id<C>(db: &C, id: i32) -> Result<Option<book::Model>, DbErr>
where
    C: ConnectionTrait,
{
    book::Entity::find_by_id(id).one(db).await
}

pub async fn find_book_by_name<C>(db: &C, name: &str) -> Result<Option<book::Model>, DbErr>
where
    C: ConnectionTrait,
{
    book::Entity::find()
        .filter(book::Column::Name.eq(name))
        .one(db)
        .await
}

/// All authors in insertion order, each carrying its books in insertion order.
pub async fn list_all_authors<C>(db: &C) -> Result<Vec<AuthorListing>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = author::Entity::find()
        .order_by_asc(author::Column::Id)
        .find_with_related(book::Entity)
        .order_by_asc(book::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(author, books)| AuthorListing { author, books })
        .collect())
}

pub async fn create_author<C>(db: &C, name: &str) -> Result<author::Model, DbErr>
where
    C: ConnectionTrait,
{
    author::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_owned()),
    }
    .insert(db)
    .await
}

pub async fn create_book<C>(db: &C, name: &str, author_id: i32) -> Result<book::Model, DbErr>
where
    C: ConnectionTrait,
{
    book::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_owned()),
        author_id: ActiveValue::Set(author_id),
    }
    .insert(db)
    .await
}

/// Remove every book written by `author_id`, returning how many went away.
pub async fn delete_books_by_author<C>(db: &C, author_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = book::Entity::delete_many()
        .filter(book::Column::AuthorId.eq(author_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_author<C>(db: &C, author: author::Model) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    author.delete(db).await?;
    Ok(())
}

pub async fn delete_book<C>(db: &C, book: book::Model) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    book.delete(db).await?;
    Ok(())
}
