//! HTTP handlers for the catalog page.
//!
//! Failures never escape as bare strings: every notice, whether it comes from
//! the add form or a delete link, is shown on the rendered listing with a
//! status code that matches it. Successful deletes redirect to the listing.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use bookshelf_http::error::AppError;
use sea_orm::DatabaseConnection;

use super::{
    form::{AddBookForm, FieldError},
    operations::{self, AddOutcome, DeleteError},
    repository,
    view::{Notice, Page},
};

/// Handler state shared by the catalog routes.
#[derive(Clone)]
pub struct CatalogState {
    pub db: DatabaseConnection,
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/", get(show_catalog).post(add_book))
        .route("/delete_author/{author_id}", get(delete_author))
        .route("/delete_book/{book_id}", get(delete_book))
        .with_state(state)
}

async fn show_catalog(State(state): State<CatalogState>) -> Result<Response, AppError> {
    render(&state, StatusCode::OK, None, &AddBookForm::default(), &[]).await
}

async fn add_book(
    State(state): State<CatalogState>,
    form: Result<Form<AddBookForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable add-book submission");
            AddBookForm::default()
        }
    };

    let new_book = match form.validate() {
        Ok(new_book) => new_book,
        Err(errors) => {
            return render(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(Notice::InvalidParameters),
                &form,
                &errors,
            )
            .await;
        }
    };

    match operations::add_book(&state.db, &new_book).await {
        Ok(AddOutcome::AuthorAndBookCreated { author, book }) => {
            tracing::info!(author_id = author.id, book_id = book.id, "author and book added");
            render(&state, StatusCode::OK, None, &AddBookForm::default(), &[]).await
        }
        Ok(AddOutcome::BookCreated(book)) => {
            tracing::info!(author_id = book.author_id, book_id = book.id, "book added");
            render(&state, StatusCode::OK, None, &AddBookForm::default(), &[]).await
        }
        Ok(AddOutcome::BookAlreadyExists(existing)) => {
            tracing::info!(book_id = existing.id, "book already in catalog");
            render(
                &state,
                StatusCode::CONFLICT,
                Some(Notice::BookAlreadyExists),
                &form,
                &[],
            )
            .await
        }
        Err(e) => {
            tracing::error!(error = %e, "adding book failed, transaction rolled back");
            render(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(Notice::AddFailed),
                &form,
                &[],
            )
            .await
        }
    }
}

async fn delete_author(
    State(state): State<CatalogState>,
    Path(author_id): Path<String>,
) -> Result<Response, AppError> {
    match operations::delete_author(&state.db, &author_id).await {
        Ok(removed) => {
            tracing::info!(
                author_id = removed.author.id,
                books_removed = removed.books_removed,
                "author deleted"
            );
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(%author_id, error = %e, "author deletion refused");
            let (status, notice) = delete_failure(
                &e,
                Notice::AuthorLookupFailed,
                Notice::AuthorNotFound,
                Notice::AuthorDeletionFailed,
            );
            render(&state, status, Some(notice), &AddBookForm::default(), &[]).await
        }
    }
}

async fn delete_book(
    State(state): State<CatalogState>,
    Path(book_id): Path<String>,
) -> Result<Response, AppError> {
    match operations::delete_book(&state.db, &book_id).await {
        Ok(book) => {
            tracing::info!(book_id = book.id, "book deleted");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(%book_id, error = %e, "book deletion refused");
            let (status, notice) = delete_failure(
                &e,
                Notice::BookLookupFailed,
                Notice::BookNotFound,
                Notice::BookDeletionFailed,
            );
            render(&state, status, Some(notice), &AddBookForm::default(), &[]).await
        }
    }
}

fn delete_failure(
    error: &DeleteError,
    lookup_failed: Notice,
    not_found: Notice,
    deletion_failed: Notice,
) -> (StatusCode, Notice) {
    match error {
        DeleteError::MalformedId(_) => (StatusCode::BAD_REQUEST, lookup_failed),
        DeleteError::Lookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, lookup_failed),
        DeleteError::NotFound => (StatusCode::NOT_FOUND, not_found),
        DeleteError::Mutation(_) => (StatusCode::INTERNAL_SERVER_ERROR, deletion_failed),
    }
}

async fn render(
    state: &CatalogState,
    status: StatusCode,
    notice: Option<Notice>,
    form: &AddBookForm,
    field_errors: &[FieldError],
) -> Result<Response, AppError> {
    let listing = match repository::list_all_authors(&state.db).await {
        Ok(listing) => Some(listing),
        // A notice is still shown when the listing cannot be read.
        Err(e) if notice.is_some() => {
            tracing::error!(error = %e, "catalog listing unavailable");
            None
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context("failed to load catalog listing")
                .into());
        }
    };

    let page = Page {
        listing: listing.as_deref(),
        form,
        field_errors,
        notice,
    };
    Ok((status, Html(page.render())).into_response())
}
