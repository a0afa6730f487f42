//! Physical storage layout types and their content hash.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A column: name, type and optional comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            comment: None,
        }
    }
}

/// One sort column and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub column: String,
    pub ascending: bool,
}

/// Serializer/deserializer description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerDeInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serialization_lib: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Skew specification: skewed columns, their hot values, and where each
/// hot value combination is stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkewedInfo {
    #[serde(default)]
    pub skewed_col_names: Vec<String>,
    #[serde(default)]
    pub skewed_col_values: Vec<Vec<String>>,
    #[serde(default, with = "value_location_pairs")]
    pub skewed_col_value_location_maps: BTreeMap<Vec<String>, String>,
}

impl SkewedInfo {
    /// The empty skew record: no columns, no values, no locations.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.skewed_col_names.is_empty()
            && self.skewed_col_values.is_empty()
            && self.skewed_col_value_location_maps.is_empty()
    }
}

/// Map keys are value lists, which text formats cannot use as object keys,
/// so the map travels as a list of `(values, location)` pairs.
mod value_location_pairs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Vec<String>, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&Vec<String>, &String)> = map.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Vec<String>, String>, D::Error> {
        let pairs: Vec<(Vec<String>, String)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// Physical layout shared by structurally identical tables and partitions.
///
/// `location` and `parameters` belong to the owning entity, not the layout:
/// they are left out of [`StorageLayout::content_hash`] and cleared before a
/// layout is shared.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageLayout {
    #[serde(default)]
    pub columns: Vec<FieldSchema>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub input_format: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub compressed: bool,
    #[serde(default)]
    pub num_buckets: i32,
    #[serde(default)]
    pub serde_info: Option<SerDeInfo>,
    #[serde(default)]
    pub bucket_columns: Option<Vec<String>>,
    #[serde(default)]
    pub sort_columns: Option<Vec<SortOrder>>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(default)]
    pub skewed_info: Option<SkewedInfo>,
    #[serde(default)]
    pub stored_as_sub_directories: bool,
}

impl StorageLayout {
    /// Copy of this layout with the per-entity fields cleared.
    pub fn shared_part(&self) -> StorageLayout {
        StorageLayout {
            location: String::new(),
            parameters: HashMap::new(),
            ..self.clone()
        }
    }

    /// Fill the structural fields that must never be absent on an assembled
    /// entity.
    pub fn fill_structural_defaults(&mut self) {
        self.bucket_columns.get_or_insert_with(Vec::new);
        self.sort_columns.get_or_insert_with(Vec::new);
        self.skewed_info.get_or_insert_with(SkewedInfo::empty);
    }

    /// BLAKE3 hash over a canonical, length-prefixed encoding of every shared
    /// field. Map fields are visited in key order.
    pub fn content_hash(&self) -> LayoutHash {
        let mut enc = CanonicalEncoder::new();

        enc.len(self.columns.len());
        for col in &self.columns {
            enc.str(&col.name);
            enc.str(&col.type_name);
            enc.opt_str(col.comment.as_deref());
        }
        enc.opt_str(self.input_format.as_deref());
        enc.opt_str(self.output_format.as_deref());
        enc.flag(self.compressed);
        enc.bytes(&self.num_buckets.to_le_bytes());

        match &self.serde_info {
            Some(serde) => {
                enc.flag(true);
                enc.opt_str(serde.name.as_deref());
                enc.opt_str(serde.serialization_lib.as_deref());
                enc.len(serde.parameters.len());
                for (k, v) in &serde.parameters {
                    enc.str(k);
                    enc.str(v);
                }
            }
            None => enc.flag(false),
        }

        match &self.bucket_columns {
            Some(cols) => {
                enc.flag(true);
                enc.strs(cols);
            }
            None => enc.flag(false),
        }

        match &self.sort_columns {
            Some(orders) => {
                enc.flag(true);
                enc.len(orders.len());
                for order in orders {
                    enc.str(&order.column);
                    enc.flag(order.ascending);
                }
            }
            None => enc.flag(false),
        }

        match &self.skewed_info {
            Some(skew) => {
                enc.flag(true);
                enc.strs(&skew.skewed_col_names);
                enc.len(skew.skewed_col_values.len());
                for values in &skew.skewed_col_values {
                    enc.strs(values);
                }
                enc.len(skew.skewed_col_value_location_maps.len());
                for (values, location) in &skew.skewed_col_value_location_maps {
                    enc.strs(values);
                    enc.str(location);
                }
            }
            None => enc.flag(false),
        }

        enc.flag(self.stored_as_sub_directories);
        enc.finish()
    }
}

/// Length-prefixed field encoder feeding a BLAKE3 hasher. Every variable
/// length field carries its length so adjacent fields cannot run together.
struct CanonicalEncoder {
    hasher: blake3::Hasher,
}

impl CanonicalEncoder {
    fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    fn bytes(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn len(&mut self, n: usize) {
        self.hasher.update(&(n as u64).to_le_bytes());
    }

    fn flag(&mut self, b: bool) {
        self.hasher.update(&[u8::from(b)]);
    }

    fn str(&mut self, s: &str) {
        self.len(s.len());
        self.hasher.update(s.as_bytes());
    }

    fn opt_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.flag(true);
                self.str(s);
            }
            None => self.flag(false),
        }
    }

    fn strs(&mut self, items: &[String]) {
        self.len(items.len());
        for item in items {
            self.str(item);
        }
    }

    fn finish(self) -> LayoutHash {
        LayoutHash(*self.hasher.finalize().as_bytes())
    }
}

/// Content hash identifying a shared storage layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutHash([u8; 32]);

impl LayoutHash {
    /// Lowercase hex form, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for LayoutHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for LayoutHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayoutHash({})", &self.to_hex()[..16])
    }
}
