//! Synthetic electronics catalog shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use catalog_search::{
    CatalogDump, CategoryRow, ProductRow, RankingConfig, SearchEngine, StubEmbedder,
    engine_from_dump,
};

pub const DIM: usize = 128;

pub const CATEGORY_NAMES: [&str; 14] = [
    "Microcontrollers",
    "Sensors",
    "Displays",
    "Relays",
    "Tools",
    "Motors",
    "Motor Drivers",
    "Power Supplies",
    "Wireless",
    "Passives",
    "Connectors",
    "Soldering",
    "Kits",
    "Books",
];

const NOUNS: [&str; 15] = [
    "Board", "Module", "Kit", "Sensor", "Wire", "Relay", "Driver", "Shield", "Iron", "Battery",
    "Motor", "Display", "Breadboard", "Connector", "Adapter",
];

const ADJECTIVES: [&str; 7] = ["Mini", "Pro", "Starter", "Compact", "Digital", "Smart", "Basic"];

/// Category of product `i`: round-robin over ids 1..=14.
pub fn category_of(i: usize) -> i64 {
    (i % CATEGORY_NAMES.len()) as i64 + 1
}

pub fn product_name(i: usize) -> String {
    format!(
        "{} {} {}",
        ADJECTIVES[i % ADJECTIVES.len()],
        CATEGORY_NAMES[i % CATEGORY_NAMES.len()],
        NOUNS[(i / 3) % NOUNS.len()]
    )
}

/// `count` products with ids `1000 + i`, embedded with the stub embedder.
pub fn dump(count: usize) -> CatalogDump {
    let embedder = StubEmbedder::new(DIM);
    let categories = CATEGORY_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| CategoryRow {
            category_id: i as i64 + 1,
            category_name: name.to_string(),
        })
        .collect();
    let products = (0..count)
        .map(|i| {
            let name = product_name(i);
            ProductRow::new(1000 + i as i64, name.as_str())
                .with_category(category_of(i))
                .with_embedding(&embedder.embed_sync(&name))
        })
        .collect();
    CatalogDump {
        categories,
        products,
    }
}

pub fn engine_with_config(count: usize, config: RankingConfig) -> SearchEngine {
    engine_from_dump(dump(count), Arc::new(StubEmbedder::new(DIM)), config)
        .expect("engine builds")
}

pub fn engine(count: usize) -> SearchEngine {
    engine_with_config(count, RankingConfig::default())
}
