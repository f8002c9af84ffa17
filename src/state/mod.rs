/// State management module
///
/// This module holds everything the annotation session owns:
/// - Shared data structures (data.rs)
/// - Attribute enumerations and records (labels.rs, annotation.rs)
/// - Durable settings and the omission ledger (config.rs, omission.rs)
/// - The image catalog and navigation cursor (catalog.rs, cursor.rs)
/// - The annotation store and its file (store.rs)

pub mod annotation;
pub mod catalog;
pub mod config;
pub mod cursor;
pub mod data;
pub mod labels;
pub mod omission;
pub mod store;
