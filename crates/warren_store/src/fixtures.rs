//! Shared test models.

use warren_foundation::{EntityName, Result};

use crate::context::Context;
use crate::descriptor::{Inverse, ToManyField, ToOneField};
use crate::entity::EntityModel;
use crate::relation::{ToMany, ToOne};

/// Author with a mutual to-many `books` relation.
#[derive(Clone, Debug, PartialEq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub books: ToMany<Book>,
}

impl Author {
    pub const BOOKS: ToManyField<Author, Book> = ToManyField::mutual(
        "books",
        Inverse::to_one("author"),
        |author| &author.books,
        |author| &mut author.books,
    );

    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            books: ToMany::none(),
        }
    }
}

impl EntityModel for Author {
    type Id = String;

    fn entity_name() -> EntityName {
        EntityName::new("Author")
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn normalize(&mut self) {
        self.books.normalize();
    }

    fn save(&self, context: &mut Context) -> Result<()> {
        context.insert(self);
        Self::BOOKS.save(self, context)
    }
}

/// Book with a mutual to-one `author` relation.
#[derive(Clone, Debug, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: ToOne<Author>,
}

impl Book {
    pub const AUTHOR: ToOneField<Book, Author> = ToOneField::mutual(
        "author",
        Inverse::to_many("books"),
        |book| &book.author,
        |book| &mut book.author,
    );

    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            author: ToOne::none(),
        }
    }
}

impl EntityModel for Book {
    type Id = String;

    fn entity_name() -> EntityName {
        EntityName::new("Book")
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn normalize(&mut self) {
        self.author.normalize();
    }

    fn save(&self, context: &mut Context) -> Result<()> {
        context.insert(self);
        Self::AUTHOR.save(self, context)
    }
}

/// Tag without relations.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

impl Tag {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

impl EntityModel for Tag {
    type Id = String;

    fn entity_name() -> EntityName {
        EntityName::new("Tag")
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn normalize(&mut self) {}

    fn save(&self, context: &mut Context) -> Result<()> {
        context.insert(self);
        Ok(())
    }
}
