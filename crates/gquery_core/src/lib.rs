//! Document normalization for gquery.
//!
//! This crate holds the pieces of the client that work on documents and
//! response data rather than on the network:
//! - `ast`: owned `graphql-parser` document types and parsing
//! - `stringify`: canonical single-line document text
//! - `typename`: `__typename` injection
//! - `collect`: distinct `__typename` values of a response

pub mod ast;
pub mod collect;
pub mod stringify;
pub mod typename;

pub use ast::{parse_document, Document, DocumentError, DocumentSource, OperationDocument};
pub use collect::collect_types_from_response;
pub use stringify::{normalize, stringify};
pub use typename::{add_typename, has_typename, is_typename_complete, TYPENAME};
