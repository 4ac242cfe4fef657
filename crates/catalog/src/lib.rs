//! # Catalog snapshot
//!
//! Read-only, in-memory view of the product catalog used by search.
//!
//! Rows come from a [`CatalogSource`] (a JSON dump out of the box) and are
//! turned into a [`CatalogSnapshot`] once at startup. Every
//! [`ProductRecord`] carries the row number it occupies in the vector index
//! built from the snapshot, so retrieval never relies on two separately built
//! sequences staying in step.
//!
//! ```
//! use catalog::{CatalogSnapshot, ProductRow};
//!
//! let rows = vec![
//!     ProductRow::new(1, "NE555 Timer").with_category(1).with_embedding(&[0.1, 0.9]),
//!     ProductRow::new(2, "Not embedded yet"),
//! ];
//! let snapshot = CatalogSnapshot::build(rows, Vec::new()).unwrap();
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(snapshot.by_row(0).unwrap().id, 1);
//! ```

mod codec;
mod error;
mod snapshot;
mod source;

pub use crate::codec::{decode_embedding, encode_embedding, encode_embedding_base64};
pub use crate::error::CatalogError;
pub use crate::snapshot::{CatalogSnapshot, ProductRecord};
pub use crate::source::{
    embedding_text, CatalogDump, CatalogSource, CategoryRow, JsonCatalogSource, ProductRow,
};
