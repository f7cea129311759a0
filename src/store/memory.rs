//! In-memory column store
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;

use super::log::Mutation;
use super::ColumnStore;

type Row = BTreeMap<Vec<u8>, Bytes>;
type Table = BTreeMap<Vec<u8>, Row>;

/// In-memory column store
///
/// ## Concurrency:
/// - `tables`: Protected by RwLock (many concurrent readers, exclusive writer)
/// - Empty rows and tables are pruned so `rows()` only reports live keys
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a logged mutation
    pub fn apply(&self, mutation: Mutation) {
        match mutation {
            Mutation::Put {
                table,
                row,
                column,
                value,
            } => self.insert(table, row, column, Bytes::from(value)),
            Mutation::Delete { table, row, column } => self.remove(&table, &row, &column),
            Mutation::DeleteRow { table, row } => self.remove_row(&table, &row),
        }
    }

    /// Snapshot every live cell as a `Put` mutation (for log compaction)
    pub fn snapshot(&self) -> Vec<Mutation> {
        let tables = self.tables.read();
        let mut mutations = Vec::new();
        for (table, rows) in tables.iter() {
            for (row, columns) in rows {
                for (column, value) in columns {
                    mutations.push(Mutation::Put {
                        table: table.clone(),
                        row: row.clone(),
                        column: column.clone(),
                        value: value.to_vec(),
                    });
                }
            }
        }
        mutations
    }

    /// Total number of cells across all tables
    pub fn cell_count(&self) -> usize {
        self.tables
            .read()
            .values()
            .flat_map(|rows| rows.values())
            .map(|columns| columns.len())
            .sum()
    }

    fn insert(&self, table: String, row: Vec<u8>, column: Vec<u8>, value: Bytes) {
        let mut tables = self.tables.write();
        tables
            .entry(table)
            .or_default()
            .entry(row)
            .or_default()
            .insert(column, value);
    }

    fn remove(&self, table: &str, row: &[u8], column: &[u8]) {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(table) else {
            return;
        };
        if let Some(columns) = rows.get_mut(row) {
            columns.remove(column);
            if columns.is_empty() {
                rows.remove(row);
            }
        }
        if rows.is_empty() {
            tables.remove(table);
        }
    }

    fn remove_row(&self, table: &str, row: &[u8]) {
        let mut tables = self.tables.write();
        if let Some(rows) = tables.get_mut(table) {
            rows.remove(row);
            if rows.is_empty() {
                tables.remove(table);
            }
        }
    }
}

impl ColumnStore for MemoryStore {
    fn get(&self, table: &str, row: &[u8], column: &[u8]) -> Result<Option<Bytes>> {
        let tables = self.tables.read();
        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(row))
            .and_then(|columns| columns.get(column))
            .cloned())
    }

    fn put(&self, table: &str, row: &[u8], column: &[u8], value: Bytes) -> Result<()> {
        self.insert(table.to_string(), row.to_vec(), column.to_vec(), value);
        Ok(())
    }

    fn delete(&self, table: &str, row: &[u8], column: &[u8]) -> Result<()> {
        self.remove(table, row, column);
        Ok(())
    }

    fn delete_row(&self, table: &str, row: &[u8]) -> Result<()> {
        self.remove_row(table, row);
        Ok(())
    }

    fn rows(&self, table: &str) -> Result<Vec<Vec<u8>>> {
        let tables = self.tables.read();
        Ok(tables
            .get(table)
            .map(|rows| rows.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn columns(&self, table: &str, row: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>> {
        let tables = self.tables.read();
        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(row))
            .map(|columns| {
                columns
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn column_count(&self, table: &str, row: &[u8]) -> Result<usize> {
        let tables = self.tables.read();
        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(row))
            .map(|columns| columns.len())
            .unwrap_or(0))
    }
}
