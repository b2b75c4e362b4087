//! Owned GraphQL executable-document types.
//!
//! The tree types come from `graphql-parser`; this module pins them to
//! `'static` + `String` so documents can be stored and moved freely, and adds
//! the two input shapes the canonicalizer accepts.

use thiserror::Error;

pub type Definition = graphql_parser::query::Definition<'static, String>;
pub type Document = graphql_parser::query::Document<'static, String>;
pub type Field = graphql_parser::query::Field<'static, String>;
pub type FragmentDefinition = graphql_parser::query::FragmentDefinition<'static, String>;
pub type InlineFragment = graphql_parser::query::InlineFragment<'static, String>;
pub type Mutation = graphql_parser::query::Mutation<'static, String>;
pub type OperationDefinition = graphql_parser::query::OperationDefinition<'static, String>;
pub type Query = graphql_parser::query::Query<'static, String>;
pub type Selection = graphql_parser::query::Selection<'static, String>;
pub type SelectionSet = graphql_parser::query::SelectionSet<'static, String>;
pub type Subscription = graphql_parser::query::Subscription<'static, String>;

pub type ParseError = graphql_parser::query::ParseError;

/// Errors raised while turning source text into a [`Document`].
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Parses an executable document (operations and fragments).
pub fn parse_document(source: &str) -> Result<Document, DocumentError> {
    Ok(graphql_parser::query::parse_query::<String>(source)?.into_static())
}

/// An operation document as handed over by a call site: either
/// pre-serialized text or a parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationDocument {
    Text(String),
    Ast(Document),
}

impl OperationDocument {
    /// Borrows the document in the shape [`crate::stringify`] takes.
    pub fn as_source(&self) -> DocumentSource<'_> {
        match self {
            Self::Text(text) => DocumentSource::Text(text),
            Self::Ast(document) => DocumentSource::Document(document),
        }
    }

    /// Returns the tree form, if this document was supplied as one.
    pub fn as_ast(&self) -> Option<&Document> {
        match self {
            Self::Ast(document) => Some(document),
            Self::Text(_) => None,
        }
    }
}

impl From<Document> for OperationDocument {
    fn from(document: Document) -> Self {
        Self::Ast(document)
    }
}

impl From<String> for OperationDocument {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OperationDocument {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Borrowed input accepted by [`crate::stringify`].
#[derive(Debug, Clone, Copy)]
pub enum DocumentSource<'a> {
    Text(&'a str),
    Document(&'a Document),
    Definition(&'a Definition),
}

impl<'a> From<&'a str> for DocumentSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for DocumentSource<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a Document> for DocumentSource<'a> {
    fn from(document: &'a Document) -> Self {
        Self::Document(document)
    }
}

impl<'a> From<&'a Definition> for DocumentSource<'a> {
    fn from(definition: &'a Definition) -> Self {
        Self::Definition(definition)
    }
}

impl<'a> From<&'a OperationDocument> for DocumentSource<'a> {
    fn from(document: &'a OperationDocument) -> Self {
        document.as_source()
    }
}
