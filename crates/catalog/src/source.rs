//! Catalog build sources.
//!
//! A source hands back raw rows `(product_id, product_name, product_embedding,
//! category_id)` plus the descriptive columns used to produce embeddings. The
//! snapshot never talks to storage directly.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::base64_blob;
use crate::CatalogError;

/// One row of the products table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRow {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub product_desc1: Option<String>,
    #[serde(default)]
    pub product_desc2: Option<String>,
    #[serde(default)]
    pub product_desc3: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Packed little-endian `f32` embedding; `None` for products not yet embedded.
    #[serde(default, with = "base64_blob")]
    pub product_embedding: Option<Vec<u8>>,
}

impl ProductRow {
    pub fn new(product_id: i64, product_name: impl Into<String>) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            product_desc1: None,
            product_desc2: None,
            product_desc3: None,
            category_id: None,
            product_embedding: None,
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_embedding(mut self, vector: &[f32]) -> Self {
        self.product_embedding = Some(crate::encode_embedding(vector));
        self
    }
}

/// One row of the category table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRow {
    pub category_id: i64,
    pub category_name: String,
}

/// Everything a source returns in one load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogDump {
    #[serde(default)]
    pub categories: Vec<CategoryRow>,
    #[serde(default)]
    pub products: Vec<ProductRow>,
}

impl CatalogDump {
    pub fn category_name(&self, category_id: Option<i64>) -> Option<&str> {
        let id = category_id?;
        self.categories
            .iter()
            .find(|c| c.category_id == id)
            .map(|c| c.category_name.as_str())
    }
}

/// Anything that can produce catalog rows.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<CatalogDump, CatalogError>;
}

/// Reads a JSON catalog dump from disk.
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `dump` back to the source file, replacing it.
    ///
    /// The dump goes to a sibling temp file that is synced before the rename,
    /// so a failed write never leaves a truncated catalog behind.
    pub fn store(&self, dump: &CatalogDump) -> Result<(), CatalogError> {
        let tmp = self.path.with_extension("json.tmp");
        if let Err(err) = write_synced(&tmp, dump) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn write_synced(path: &Path, dump: &CatalogDump) -> Result<(), CatalogError> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, dump)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

impl CatalogSource for JsonCatalogSource {
    fn load(&self) -> Result<CatalogDump, CatalogError> {
        let bytes = fs::read(&self.path)?;
        let dump: CatalogDump = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            products = dump.products.len(),
            categories = dump.categories.len(),
            "catalog dump loaded"
        );
        Ok(dump)
    }
}

/// Text fed to the embedding model for one product.
///
/// Category name first, then name, then the three description columns; a
/// missing column renders as the literal `None`, which is what the stored
/// embeddings were generated from.
pub fn embedding_text(product: &ProductRow, category_name: Option<&str>) -> String {
    format!(
        "Category: {}. Name: {}. Description: {} {} {}",
        category_name.unwrap_or(MISSING),
        product.product_name,
        product.product_desc1.as_deref().unwrap_or(MISSING),
        product.product_desc2.as_deref().unwrap_or(MISSING),
        product.product_desc3.as_deref().unwrap_or(MISSING),
    )
}

const MISSING: &str = "None";
