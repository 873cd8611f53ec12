//! Product processor implementation.
//!
//! Normalizes the extracted table and turns each row into a ProductDocument.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::coercion::CoercionRules;
use crate::errors::PipelineError;
use crate::logging::RunLog;
use crate::source::{Cell, Table};
use catalog_indexer_shared::{fields, ProductDocument};

/// Processor that transforms extracted rows into search documents.
///
/// The processor is responsible for:
/// - Replacing missing-value sentinels with nulls
/// - Casting each declared field according to its coercion rule
/// - Building one sparse document per row
pub struct ProductProcessor {
    rules: CoercionRules,
    log: Arc<dyn RunLog>,
}

impl ProductProcessor {
    /// Create a processor with the default product rules.
    pub fn new(log: Arc<dyn RunLog>) -> Self {
        Self::with_rules(CoercionRules::products(), log)
    }

    pub fn with_rules(rules: CoercionRules, log: Arc<dyn RunLog>) -> Self {
        Self { rules, log }
    }

    /// Normalize the table and return its documents.
    ///
    /// All coercion happens here, before the first document is produced, so
    /// a cast failure leaves no partial output behind.
    pub fn normalize(&self, mut table: Table) -> Result<ProductDocuments, PipelineError> {
        self.log.info("Cleaning and preparing data for the index");

        table.map_cells(|cell| if cell.is_missing() { Cell::Null } else { cell });

        if table.column_index(fields::PRODUCT_ID).is_none() {
            return Err(PipelineError::coercion(
                fields::PRODUCT_ID,
                "identity column is missing from the extracted table",
            ));
        }

        for rule in self.rules.iter() {
            let Some(index) = table.column_index(&rule.field) else {
                continue;
            };
            table.try_map_column(index, |row, cell| rule.apply(row, cell))?;
            table.set_column_kind(index, rule.target.into());
        }

        let (columns, rows) = table.into_parts();

        if let Some(id_index) = columns.iter().position(|c| c.name == fields::PRODUCT_ID) {
            if let Some(row) = rows.iter().position(|r| r[id_index].as_integer().is_none()) {
                return Err(PipelineError::coercion(
                    fields::PRODUCT_ID,
                    format!("row {}: document identity must be an integer", row),
                ));
            }
        }

        let positions: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        for column in &columns {
            if self.rules.get(&column.name).is_none() {
                debug!(column = %column.name, "Column has no coercion rule and is not indexed");
            }
        }

        Ok(ProductDocuments {
            positions,
            rows: rows.into_iter(),
        })
    }
}

/// Documents produced from a normalized table, one per row.
///
/// Consumes the table as it is iterated; it cannot be restarted.
pub struct ProductDocuments {
    positions: HashMap<String, usize>,
    rows: std::vec::IntoIter<Vec<Cell>>,
}

impl ProductDocuments {
    fn cell<'a>(&self, row: &'a [Cell], field: &str) -> Option<&'a Cell> {
        self.positions.get(field).and_then(|&i| row.get(i))
    }

    fn text(&self, row: &[Cell], field: &str) -> Option<String> {
        self.cell(row, field)
            .and_then(Cell::as_text)
            .map(str::to_string)
    }

    fn float(&self, row: &[Cell], field: &str) -> Option<f64> {
        self.cell(row, field).and_then(Cell::as_float)
    }

    fn integer(&self, row: &[Cell], field: &str) -> Option<i64> {
        self.cell(row, field).and_then(Cell::as_integer)
    }

    fn build(&self, row: &[Cell]) -> Option<ProductDocument> {
        Some(ProductDocument {
            product_id: self.integer(row, fields::PRODUCT_ID)?,
            name: self.text(row, fields::NAME),
            product_number: self.text(row, fields::PRODUCT_NUMBER),
            color: self.text(row, fields::COLOR),
            list_price: self.float(row, fields::LIST_PRICE),
            size: self.text(row, fields::SIZE),
            weight: self.float(row, fields::WEIGHT),
            stock_level: self.integer(row, fields::STOCK_LEVEL),
            product_model_id: self.integer(row, fields::PRODUCT_MODEL_ID),
        })
    }
}

impl Iterator for ProductDocuments {
    type Item = ProductDocument;

    fn next(&mut self) -> Option<ProductDocument> {
        // Identity was validated in `normalize`, so `build` succeeds for every row.
        loop {
            let row = self.rows.next()?;
            if let Some(doc) = self.build(&row) {
                return Some(doc);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for ProductDocuments {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryRunLog;
    use crate::processor::{CoercionRule, NullPolicy, TargetKind};
    use crate::source::{Column, ColumnKind};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Cell {
        Cell::Decimal(Decimal::from_str(s).unwrap())
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn product_table() -> Table {
        Table::new(vec![
            Column::new("product_id", ColumnKind::Integer),
            Column::new("name", ColumnKind::Text),
            Column::new("product_number", ColumnKind::Text),
            Column::new("color", ColumnKind::Text),
            Column::new("list_price", ColumnKind::Decimal),
            Column::new("size", ColumnKind::Text),
            Column::new("weight", ColumnKind::Decimal),
            Column::new("stock_level", ColumnKind::Integer),
            Column::new("product_model_id", ColumnKind::Integer),
        ])
    }

    fn processor() -> ProductProcessor {
        ProductProcessor::new(Arc::new(MemoryRunLog::new()))
    }

    #[test]
    fn test_normalize_builds_sparse_documents() {
        let mut table = product_table();
        table.push_row(vec![
            Cell::Integer(771),
            text("Mountain-100 Silver, 38"),
            text("BK-M82S-38"),
            text("Silver"),
            dec("3399.99"),
            text("38"),
            dec("20.35"),
            Cell::Integer(100),
            Cell::Integer(19),
        ]);
        table.push_row(vec![
            Cell::Integer(680),
            text("HL Road Frame - Black, 58"),
            text("FR-R92B-58"),
            Cell::Null,
            dec("1431.50"),
            Cell::Null,
            dec("2.24"),
            Cell::Integer(500),
            Cell::Null,
        ]);

        let docs: Vec<ProductDocument> = processor().normalize(table).unwrap().collect();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].product_id, 771);
        assert_eq!(docs[0].list_price, Some(3399.99));
        assert_eq!(docs[0].weight, Some(20.35));
        assert_eq!(docs[0].stock_level, Some(100));
        assert_eq!(docs[0].product_model_id, Some(19));

        let sparse = docs[1].to_source();
        assert!(!sparse.contains_key("color"));
        assert!(!sparse.contains_key("size"));
        assert!(!sparse.contains_key("product_model_id"));
        assert!(sparse.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let mut table = Table::new(vec![
            Column::new("product_id", ColumnKind::Integer),
            Column::new("weight", ColumnKind::Float),
        ]);
        table.push_row(vec![Cell::Integer(1), Cell::Float(f64::NAN)]);

        let docs: Vec<ProductDocument> = processor().normalize(table).unwrap().collect();

        assert_eq!(docs[0].weight, None);
    }

    #[test]
    fn test_null_stock_level_fails_whole_run() {
        let mut table = product_table();
        table.push_row(vec![
            Cell::Integer(1),
            text("Widget"),
            text("W-1"),
            Cell::Null,
            dec("9.99"),
            Cell::Null,
            dec("1.2"),
            Cell::Null,
            Cell::Null,
        ]);

        let result = processor().normalize(table);

        assert!(matches!(
            result,
            Err(PipelineError::CoercionError { ref field, .. }) if field == "stock_level"
        ));
    }

    #[test]
    fn test_malformed_list_price_fails_even_after_valid_rows() {
        let mut table = Table::new(vec![
            Column::new("product_id", ColumnKind::Integer),
            Column::new("list_price", ColumnKind::Text),
        ]);
        table.push_row(vec![Cell::Integer(1), text("10.00")]);
        table.push_row(vec![Cell::Integer(2), text("ten")]);

        let result = processor().normalize(table);

        assert!(matches!(
            result,
            Err(PipelineError::CoercionError { ref field, ref reason })
                if field == "list_price" && reason.starts_with("row 1")
        ));
    }

    #[test]
    fn test_absent_optional_columns_are_skipped() {
        let mut table = Table::new(vec![
            Column::new("product_id", ColumnKind::Integer),
            Column::new("name", ColumnKind::Text),
        ]);
        table.push_row(vec![Cell::Integer(5), text("Gizmo")]);

        let docs: Vec<ProductDocument> = processor().normalize(table).unwrap().collect();

        assert_eq!(docs, vec![ProductDocument {
            name: Some("Gizmo".to_string()),
            ..ProductDocument::new(5)
        }]);
    }

    #[test]
    fn test_missing_identity_column_fails() {
        let mut table = Table::new(vec![Column::new("name", ColumnKind::Text)]);
        table.push_row(vec![text("No id")]);

        let result = processor().normalize(table);
        assert!(matches!(result, Err(PipelineError::CoercionError { .. })));
    }

    #[test]
    fn test_null_identity_fails_even_with_relaxed_rule() {
        let rules = CoercionRules::products().with_rule(CoercionRule::new(
            "product_id",
            TargetKind::Integer,
            NullPolicy::PropagateNull,
        ))
        .unwrap();
        let mut table = Table::new(vec![Column::new("product_id", ColumnKind::Integer)]);
        table.push_row(vec![Cell::Null]);

        let result = ProductProcessor::with_rules(rules, Arc::new(MemoryRunLog::new()))
            .normalize(table);
        assert!(matches!(result, Err(PipelineError::CoercionError { .. })));
    }

    #[test]
    fn test_relaxed_stock_rule_drops_field() {
        let rules = CoercionRules::products().with_rule(CoercionRule::new(
            "stock_level",
            TargetKind::Integer,
            NullPolicy::PropagateNull,
        ))
        .unwrap();
        let mut table = Table::new(vec![
            Column::new("product_id", ColumnKind::Integer),
            Column::new("stock_level", ColumnKind::Integer),
        ]);
        table.push_row(vec![Cell::Integer(1), Cell::Null]);

        let mut docs = ProductProcessor::with_rules(rules, Arc::new(MemoryRunLog::new()))
            .normalize(table)
            .unwrap();

        assert_eq!(docs.len(), 1);
        let doc = docs.next().unwrap();
        assert_eq!(doc.stock_level, None);
        assert!(docs.next().is_none());
    }
}
