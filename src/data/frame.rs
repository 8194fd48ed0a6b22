//! In-memory passenger table
//!
//! A `Frame` is a set of equally long named columns plus the passenger id index.
//! Column order is insertion order and is preserved by every operation, which
//! keeps the written output deterministic.

use std::collections::HashSet;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(values) => values.len(),
            Column::Float(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell rendered for a delimited file; missing cells are empty.
    pub fn format_cell(&self, row: usize) -> String {
        match self {
            Column::Int(values) => values[row].map(|v| v.to_string()).unwrap_or_default(),
            Column::Float(values) => values[row].map(format_float).unwrap_or_default(),
            Column::Text(values) => values[row].clone().unwrap_or_default(),
        }
    }

    /// Numeric view of a cell; text cells have none.
    pub fn as_f64(&self, row: usize) -> Option<f64> {
        match self {
            Column::Int(values) => values[row].map(|v| v as f64),
            Column::Float(values) => values[row],
            Column::Text(_) => None,
        }
    }

    fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Int(values) => Column::Int(rows.iter().map(|&i| values[i]).collect()),
            Column::Float(values) => Column::Float(rows.iter().map(|&i| values[i]).collect()),
            Column::Text(values) => Column::Text(rows.iter().map(|&i| values[i].clone()).collect()),
        }
    }

    fn append(&mut self, other: Column) -> std::result::Result<(), Column> {
        match (self, other) {
            (Column::Int(a), Column::Int(b)) => a.extend(b),
            (Column::Float(a), Column::Float(b)) => a.extend(b),
            (Column::Text(a), Column::Text(b)) => a.extend(b),
            (_, other) => return Err(other),
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        match self {
            Column::Int(_) => "integer",
            Column::Float(_) => "float",
            Column::Text(_) => "text",
        }
    }
}

/// Shortest round-trip form, always with a fractional part for integral values.
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    index: Vec<i64>,
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(index: Vec<i64>) -> Self {
        Self {
            index,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Replaces the column in place if it exists, otherwise appends it.
    pub fn insert(&mut self, name: &str, column: Column) {
        assert_eq!(column.len(), self.len(), "column `{name}` length mismatch");
        match self.position(name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name.to_string());
                self.columns.push(column);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let i = self.position(name)?;
        self.names.remove(i);
        Some(self.columns.remove(i))
    }

    /// Moves a column to the first position, keeping the others in order.
    pub fn move_to_front(&mut self, name: &str) -> Result<()> {
        let i = self
            .position(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;
        let name = self.names.remove(i);
        let column = self.columns.remove(i);
        self.names.insert(0, name);
        self.columns.insert(0, column);
        Ok(())
    }

    pub fn ints(&self, name: &str) -> Result<&[Option<i64>]> {
        match self.column(name)? {
            Column::Int(values) => Ok(values),
            _ => Err(type_error(name, "integer")),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name)? {
            Column::Float(values) => Ok(values),
            _ => Err(type_error(name, "float")),
        }
    }

    pub fn texts(&self, name: &str) -> Result<&[Option<String>]> {
        match self.column(name)? {
            Column::Text(values) => Ok(values),
            _ => Err(type_error(name, "text")),
        }
    }

    /// Keeps the rows whose mask entry is true, in order.
    pub fn filter(&self, mask: &[bool]) -> Frame {
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();

        Frame {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(&rows)).collect(),
        }
    }

    /// Row-wise concatenation. Both frames must carry the same columns with the
    /// same types, and passenger ids must stay unique.
    pub fn concat(mut self, other: Frame) -> Result<Frame> {
        let mut seen: HashSet<i64> = self.index.iter().copied().collect();
        if seen.len() != self.index.len() {
            return Err(first_duplicate(&self.index));
        }
        for &id in &other.index {
            if !seen.insert(id) {
                return Err(PipelineError::DuplicatePassengerId(id));
            }
        }

        let Frame {
            index,
            names,
            columns,
        } = other;
        if names.len() != self.names.len() {
            let missing = self
                .names
                .iter()
                .chain(names.iter())
                .find(|n| !self.names.contains(n) || !names.contains(n))
                .cloned()
                .unwrap_or_default();
            return Err(PipelineError::MissingColumn(missing));
        }

        for (name, column) in names.into_iter().zip(columns) {
            let i = self
                .position(&name)
                .ok_or_else(|| PipelineError::MissingColumn(name.clone()))?;
            let expected = self.columns[i].kind();
            self.columns[i]
                .append(column)
                .map_err(|_| type_error(&name, expected))?;
        }
        self.index.extend(index);
        Ok(self)
    }
}

fn type_error(name: &str, expected: &'static str) -> PipelineError {
    PipelineError::ColumnType {
        name: name.to_string(),
        expected,
    }
}

fn first_duplicate(index: &[i64]) -> PipelineError {
    let mut seen = HashSet::new();
    let id = index.iter().copied().find(|id| !seen.insert(*id)).unwrap_or_default();
    PipelineError::DuplicatePassengerId(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        let mut frame = Frame::new(vec![1, 2, 3]);
        frame.insert("a", Column::Int(vec![Some(1), None, Some(3)]));
        frame.insert("b", Column::Text(vec![Some("x".into()), Some("y".into()), None]));
        frame
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut frame = sample();
        frame.insert("a", Column::Float(vec![Some(1.5), Some(2.0), None]));
        assert_eq!(frame.column_names(), ["a", "b"]);
        assert!(frame.floats("a").is_ok());
        assert!(matches!(frame.ints("a"), Err(PipelineError::ColumnType { .. })));
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn test_insert_rejects_ragged_column() {
        let mut frame = sample();
        frame.insert("c", Column::Int(vec![Some(1)]));
    }

    #[test]
    fn test_move_to_front() {
        let mut frame = sample();
        frame.insert("c", Column::Int(vec![Some(0); 3]));
        frame.move_to_front("c").unwrap();
        assert_eq!(frame.column_names(), ["c", "a", "b"]);
        assert!(frame.move_to_front("zzz").is_err());
    }

    #[test]
    fn test_filter_keeps_index() {
        let frame = sample().filter(&[true, false, true]);
        assert_eq!(frame.index(), [1, 3]);
        assert_eq!(frame.ints("a").unwrap(), [Some(1), Some(3)]);
    }

    #[test]
    fn test_concat_appends_rows() {
        let mut other = Frame::new(vec![4]);
        other.insert("a", Column::Int(vec![Some(4)]));
        other.insert("b", Column::Text(vec![Some("z".into())]));
        let joined = sample().concat(other).unwrap();
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.texts("b").unwrap()[3].as_deref(), Some("z"));
    }

    #[test]
    fn test_concat_rejects_overlapping_ids() {
        let mut other = Frame::new(vec![3]);
        other.insert("a", Column::Int(vec![Some(4)]));
        other.insert("b", Column::Text(vec![None]));
        let err = sample().concat(other).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicatePassengerId(3)));
    }

    #[test]
    fn test_concat_rejects_type_mismatch() {
        let mut other = Frame::new(vec![9]);
        other.insert("a", Column::Float(vec![Some(4.0)]));
        other.insert("b", Column::Text(vec![None]));
        assert!(matches!(
            sample().concat(other),
            Err(PipelineError::ColumnType { .. })
        ));
    }

    #[test]
    fn test_format_cells() {
        assert_eq!(format_float(22.0), "22.0");
        assert_eq!(format_float(7.25), "7.25");
        let frame = sample();
        assert_eq!(frame.column("a").unwrap().format_cell(1), "");
        assert_eq!(frame.column("b").unwrap().format_cell(0), "x");
    }
}
