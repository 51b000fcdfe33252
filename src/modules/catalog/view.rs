//! HTML rendering of the catalog page.

use std::fmt;

use super::{
    form::{AddBookForm, FieldError},
    repository::AuthorListing,
};

/// One-shot message shown above the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    InvalidParameters,
    AddFailed,
    BookAlreadyExists,
    AuthorLookupFailed,
    AuthorNotFound,
    AuthorDeletionFailed,
    BookLookupFailed,
    BookNotFound,
    BookDeletionFailed,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::InvalidParameters => "invalid parameters",
            Notice::AddFailed => "add failed",
            Notice::BookAlreadyExists => "book already exists",
            Notice::AuthorLookupFailed => "author lookup failed",
            Notice::AuthorNotFound => "author does not exist",
            Notice::AuthorDeletionFailed => "author deletion failed",
            Notice::BookLookupFailed => "book lookup failed",
            Notice::BookNotFound => "book does not exist",
            Notice::BookDeletionFailed => "book deletion failed",
        }
    }
}

/// Everything the page shows for one request.
pub struct Page<'a> {
    /// `None` when the catalog could not be read.
    pub listing: Option<&'a [AuthorListing]>,
    pub form: &'a AddBookForm,
    pub field_errors: &'a [FieldError],
    pub notice: Option<Notice>,
}

impl Page<'_> {
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write_form(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<form method=\"post\" action=\"/\">")?;
        for (field, label, value) in [
            ("author", "Author", self.form.author.as_str()),
            ("book", "Book", self.form.book.as_str()),
        ] {
            writeln!(
                f,
                "<label for=\"{field}\">{label}:</label> \
                 <input type=\"text\" id=\"{field}\" name=\"{field}\" value=\"{}\">",
                escape(value)
            )?;
            for error in self.field_errors.iter().filter(|e| e.field == field) {
                writeln!(f, "<span class=\"field-error\">{}</span>", escape(error.message))?;
            }
            writeln!(f, "<br>")?;
        }
        writeln!(f, "<input type=\"submit\" value=\"Add\">\n</form>\n<hr>")
    }

    fn write_listing(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listing = match self.listing {
            None => return writeln!(f, "<p>The catalog is unavailable right now.</p>"),
            Some([]) => return writeln!(f, "<p>No authors yet.</p>"),
            Some(listing) => listing,
        };

        writeln!(f, "<ul class=\"authors\">")?;
        for entry in listing {
            writeln!(
                f,
                "<li>{} <a href=\"/delete_author/{}\">delete</a>",
                escape(&entry.author.name),
                entry.author.id
            )?;
            if !entry.books.is_empty() {
                writeln!(f, "<ul class=\"books\">")?;
                for book in &entry.books {
                    writeln!(
                        f,
                        "<li>{} <a href=\"/delete_book/{}\">delete</a></li>",
                        escape(&book.name),
                        book.id
                    )?;
                }
                writeln!(f, "</ul>")?;
            }
            writeln!(f, "</li>")?;
        }
        writeln!(f, "</ul>")
    }
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Book catalog</title>\n</head>\n<body>\n<h1>Book catalog</h1>"
        )?;

        if let Some(notice) = self.notice {
            writeln!(
                f,
                "<p class=\"notice\" role=\"alert\">{}</p>",
                escape(notice.message())
            )?;
        }

        self.write_form(f)?;
        self.write_listing(f)?;

        writeln!(f, "</body>\n</html>")
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::models::{author, book};

    fn listing() -> Vec<AuthorListing> {
        vec![AuthorListing {
            author: author::Model {
                id: 7,
                name: "<Ann & Co>".to_string(),
            },
            books: vec![book::Model {
                id: 9,
                name: "\"Quoted\"".to_string(),
                author_id: 7,
            }],
        }]
    }

    #[test]
    fn listing_escapes_names_and_links_deletes() {
        let listing = listing();
        let form = AddBookForm::default();
        let html = Page {
            listing: Some(listing.as_slice()),
            form: &form,
            field_errors: &[],
            notice: None,
        }
        .render();

        assert!(html.contains("&lt;Ann &amp; Co&gt;"));
        assert!(html.contains("&quot;Quoted&quot;"));
        assert!(html.contains("href=\"/delete_author/7\""));
        assert!(html.contains("href=\"/delete_book/9\""));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn notice_and_field_errors_are_shown() {
        let form = AddBookForm {
            author: "老王".to_string(),
            book: String::new(),
        };
        let errors = form.validate().unwrap_err();
        let html = Page {
            listing: Some(&[][..]),
            form: &form,
            field_errors: &errors,
            notice: Some(Notice::InvalidParameters),
        }
        .render();

        assert!(html.contains("invalid parameters"));
        assert!(html.contains("please enter a book title"));
        assert!(!html.contains("please enter an author"));
        assert!(html.contains("value=\"老王\""));
        assert!(html.contains("No authors yet."));
    }

    #[test]
    fn unreadable_catalog_still_shows_notice() {
        let form = AddBookForm::default();
        let html = Page {
            listing: None,
            form: &form,
            field_errors: &[],
            notice: Some(Notice::AuthorLookupFailed),
        }
        .render();

        assert!(html.contains("author lookup failed"));
        assert!(html.contains("The catalog is unavailable right now."));
        assert!(!html.contains("No authors yet."));
        assert!(html.ends_with("</html>\n"));
    }
}
