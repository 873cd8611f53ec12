//! Product document indexed into the search engine.

use serde::Serialize;
use serde_json::{json, Map, Number, Value};

/// Field names shared by the projected view and the indexed document.
pub mod fields {
    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    pub const PRODUCT_NUMBER: &str = "product_number";
    pub const COLOR: &str = "color";
    pub const LIST_PRICE: &str = "list_price";
    pub const SIZE: &str = "size";
    pub const WEIGHT: &str = "weight";
    pub const STOCK_LEVEL: &str = "stock_level";
    pub const PRODUCT_MODEL_ID: &str = "product_model_id";
}

/// A product as stored in the search index.
///
/// Every attribute except the identity is optional. Absent attributes are
/// omitted from the indexed source rather than written as `null`, so the
/// stored document is sparse.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProductDocument {
    /// Document identity in the index.
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_model_id: Option<i64>,
}

impl ProductDocument {
    /// Create a document carrying only its identity.
    pub fn new(product_id: i64) -> Self {
        Self {
            product_id,
            ..Default::default()
        }
    }

    /// The `_id` this document is written under.
    pub fn document_id(&self) -> String {
        self.product_id.to_string()
    }

    /// Build the sparse `_source` map sent to the search engine.
    ///
    /// Non-finite floats have no JSON representation and are left out along
    /// with absent fields.
    pub fn to_source(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert(fields::PRODUCT_ID.to_string(), json!(self.product_id));

        let texts = [
            (fields::NAME, &self.name),
            (fields::PRODUCT_NUMBER, &self.product_number),
            (fields::COLOR, &self.color),
            (fields::SIZE, &self.size),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                doc.insert(field.to_string(), json!(value));
            }
        }

        let floats = [
            (fields::LIST_PRICE, self.list_price),
            (fields::WEIGHT, self.weight),
        ];
        for (field, value) in floats {
            if let Some(number) = value.and_then(Number::from_f64) {
                doc.insert(field.to_string(), Value::Number(number));
            }
        }

        let integers = [
            (fields::STOCK_LEVEL, self.stock_level),
            (fields::PRODUCT_MODEL_ID, self.product_model_id),
        ];
        for (field, value) in integers {
            if let Some(value) = value {
                doc.insert(field.to_string(), json!(value));
            }
        }

        doc
    }
}
