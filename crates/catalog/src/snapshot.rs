use std::collections::{BTreeMap, HashMap};

use crate::codec::decode_embedding;
use crate::source::{CatalogDump, CategoryRow, ProductRow};
use crate::CatalogError;

/// A product that can take part in semantic search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub embedding: Vec<f32>,
    /// Row number of this product inside the vector index built from the snapshot.
    pub row: usize,
}

/// Immutable, read-only view over every embeddable product.
///
/// Built once (or rebuilt wholesale on reload) and then shared behind an
/// `Arc`. `records()[i].row == i` holds for every record, so an index built by
/// walking [`records`](Self::records) in order maps its rows straight back
/// through [`by_row`](Self::by_row).
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    records: Vec<ProductRecord>,
    by_id: HashMap<i64, usize>,
    categories: BTreeMap<i64, String>,
    dimension: usize,
    skipped: usize,
}

impl CatalogSnapshot {
    /// Builds a snapshot from raw rows.
    ///
    /// Rows without an embedding are skipped. Every kept row must decode to a
    /// non-empty vector of the same dimension and carry a unique product id.
    pub fn build<I>(rows: I, categories: Vec<CategoryRow>) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ProductRow>,
    {
        let mut records = Vec::new();
        let mut by_id = HashMap::new();
        let mut dimension = 0usize;
        let mut skipped = 0usize;

        for row in rows {
            let Some(blob) = row.product_embedding.as_deref() else {
                skipped += 1;
                continue;
            };
            let embedding = decode_embedding(row.product_id, blob)?;
            if embedding.is_empty() {
                return Err(CatalogError::EmptyEmbedding {
                    product_id: row.product_id,
                });
            }
            if dimension == 0 {
                dimension = embedding.len();
            } else if embedding.len() != dimension {
                return Err(CatalogError::DimensionMismatch {
                    product_id: row.product_id,
                    expected: dimension,
                    got: embedding.len(),
                });
            }

            let position = records.len();
            if by_id.insert(row.product_id, position).is_some() {
                return Err(CatalogError::DuplicateProduct(row.product_id));
            }
            records.push(ProductRecord {
                id: row.product_id,
                name: row.product_name,
                category_id: row.category_id,
                embedding,
                row: position,
            });
        }

        let categories = categories
            .into_iter()
            .map(|c| (c.category_id, c.category_name))
            .collect();

        tracing::info!(
            products = records.len(),
            skipped_without_embedding = skipped,
            dimension,
            "catalog snapshot built"
        );

        Ok(Self {
            records,
            by_id,
            categories,
            dimension,
            skipped,
        })
    }

    /// Convenience wrapper over [`build`](Self::build) for a full dump.
    pub fn from_dump(dump: CatalogDump) -> Result<Self, CatalogError> {
        Self::build(dump.products, dump.categories)
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Record stored at index row `row`.
    pub fn by_row(&self, row: usize) -> Option<&ProductRecord> {
        self.records.get(row)
    }

    pub fn get(&self, product_id: i64) -> Option<&ProductRecord> {
        self.by_id.get(&product_id).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding dimension shared by all records, `0` for an empty snapshot.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Rows dropped at build time because they had no embedding.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn category_name(&self, category_id: i64) -> Option<&str> {
        self.categories.get(&category_id).map(String::as_str)
    }

    /// Known categories in ascending id order.
    pub fn categories(&self) -> impl Iterator<Item = (i64, &str)> {
        self.categories.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Number of embedded products per category id.
    pub fn category_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            if let Some(category_id) = record.category_id {
                *counts.entry(category_id).or_insert(0) += 1;
            }
        }
        counts
    }
}
