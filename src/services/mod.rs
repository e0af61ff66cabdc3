pub mod analytics;
pub mod bid_types;
pub mod bids;
pub mod client_objects;
pub mod clients;
pub mod equipment;
pub mod equipment_items;
pub mod notes;
pub mod suppliers;
pub mod tokens;
pub mod warehouses;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: u64 = 20;
/// Hard cap on page size
pub const MAX_LIMIT: u64 = 100;

/// Clamp a requested limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Deserializer for `Option<Option<T>>` patch fields: a missing key leaves the
/// column untouched, an explicit `null` clears it.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}
