use serde::Deserialize;

/// Submitted add-book form. Absent fields arrive as empty strings; extra
/// fields such as the submit button are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddBookForm {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub book: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub author: String,
    pub book: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl AddBookForm {
    /// Both fields must be present and non-empty. Content is not inspected further.
    pub fn validate(&self) -> Result<NewBook, Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.author.is_empty() {
            errors.push(FieldError {
                field: "author",
                message: "please enter an author",
            });
        }
        if self.book.is_empty() {
            errors.push(FieldError {
                field: "book",
                message: "please enter a book title",
            });
        }

        if errors.is_empty() {
            Ok(NewBook {
                author: self.author.clone(),
                book: self.book.clone(),
            })
        } else {
            Err(errors)
        }
    }
}
