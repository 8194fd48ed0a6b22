//! Loading of the raw passenger tables

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use csv::{Reader, StringRecord};

use super::frame::{Column, Frame};
use crate::error::{PipelineError, Result};
use crate::types::{check_label_sentinel, columns, LABELS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
    Text,
}

struct RawColumn {
    name: &'static str,
    kind: Kind,
    nullable: bool,
}

const fn raw(name: &'static str, kind: Kind, nullable: bool) -> RawColumn {
    RawColumn { name, kind, nullable }
}

/// Raw schema after the index, in output order. The label comes first so the
/// unified table starts out in the same shape as the training source.
const RAW_SCHEMA: [RawColumn; 11] = [
    raw(columns::SURVIVED, Kind::Int, false),
    raw(columns::PCLASS, Kind::Int, false),
    raw(columns::NAME, Kind::Text, false),
    raw(columns::SEX, Kind::Text, false),
    raw(columns::AGE, Kind::Float, true),
    raw(columns::SIBSP, Kind::Int, false),
    raw(columns::PARCH, Kind::Int, false),
    raw(columns::TICKET, Kind::Text, true),
    raw(columns::FARE, Kind::Float, true),
    raw(columns::CABIN, Kind::Text, true),
    raw(columns::EMBARKED, Kind::Text, true),
];

pub struct DataLoader;

impl DataLoader {
    /// Reads both sources and stacks them, train rows first. Every test row
    /// carries `label_sentinel` as its label.
    pub fn load_unified<P: AsRef<Path>, Q: AsRef<Path>>(
        train_path: P,
        test_path: Q,
        label_sentinel: i64,
    ) -> Result<Frame> {
        check_label_sentinel(label_sentinel)?;
        let train = Self::load_table(train_path.as_ref(), None)?;
        let test = Self::load_table(test_path.as_ref(), Some(label_sentinel))?;
        let (n_train, n_test) = (train.len(), test.len());

        let unified = train.concat(test)?;
        tracing::info!(
            "Loaded {} train and {} test passengers ({} total)",
            n_train,
            n_test,
            unified.len()
        );
        Ok(unified)
    }

    /// Reads one raw table. With `label_override` the label column is not
    /// required and every row is given that value.
    pub fn load_table(path: &Path, label_override: Option<i64>) -> Result<Frame> {
        let file = File::open(path).map_err(|e| PipelineError::source_read(path, e.to_string()))?;
        Self::read_table(Reader::from_reader(file), path, label_override)
    }

    fn read_table<R: std::io::Read>(
        mut reader: Reader<R>,
        path: &Path,
        label_override: Option<i64>,
    ) -> Result<Frame> {
        let headers = reader
            .headers()
            .map_err(|e| PipelineError::source_read(path, e.to_string()))?
            .clone();
        let locate = |name: &str| headers.iter().position(|h| h.trim() == name);

        let id_pos = locate(columns::PASSENGER_ID).ok_or_else(|| {
            PipelineError::source_read(
                path,
                format!("missing required column `{}`", columns::PASSENGER_ID),
            )
        })?;

        let mut positions = Vec::with_capacity(RAW_SCHEMA.len());
        for spec in &RAW_SCHEMA {
            let pos = locate(spec.name);
            let provided_by_override = spec.name == columns::SURVIVED && label_override.is_some();
            if pos.is_none() && !provided_by_override {
                return Err(PipelineError::source_read(
                    path,
                    format!("missing required column `{}`", spec.name),
                ));
            }
            positions.push(if provided_by_override { None } else { pos });
        }

        let known: HashSet<&str> = RAW_SCHEMA
            .iter()
            .map(|c| c.name)
            .chain([columns::PASSENGER_ID])
            .collect();
        for extra in headers.iter().filter(|h| !known.contains(h.trim())) {
            tracing::warn!("Ignoring unknown column `{}` in {}", extra, path.display());
        }

        let mut index = Vec::new();
        let mut cells: Vec<Column> = RAW_SCHEMA
            .iter()
            .map(|c| match c.kind {
                Kind::Int => Column::Int(Vec::new()),
                Kind::Float => Column::Float(Vec::new()),
                Kind::Text => Column::Text(Vec::new()),
            })
            .collect();

        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| PipelineError::source_read(path, e.to_string()))?;
            let id = parse_id(&record, id_pos).ok_or_else(|| {
                let reason = format!("row {}: invalid {}", line + 1, columns::PASSENGER_ID);
                PipelineError::source_read(path, reason)
            })?;

            let cells_of_row = RAW_SCHEMA.iter().zip(&positions).zip(cells.iter_mut());
            for ((spec, pos), column) in cells_of_row {
                let raw = match pos {
                    Some(p) => record.get(*p).map(str::trim).filter(|s| !s.is_empty()),
                    None => None,
                };
                push_cell(column, spec, raw, label_override, id)
                    .map_err(|reason| PipelineError::source_read(path, reason))?;
            }
            index.push(id);
        }

        let mut frame = Frame::new(index);
        for (spec, column) in RAW_SCHEMA.iter().zip(cells) {
            frame.insert(spec.name, column);
        }
        Ok(frame)
    }
}

fn parse_id(record: &StringRecord, pos: usize) -> Option<i64> {
    record.get(pos)?.trim().parse().ok()
}

fn push_cell(
    column: &mut Column,
    spec: &RawColumn,
    raw: Option<&str>,
    label_override: Option<i64>,
    id: i64,
) -> std::result::Result<(), String> {
    if spec.name == columns::SURVIVED {
        if let (Some(label), Column::Int(values)) = (label_override, &mut *column) {
            values.push(Some(label));
            return Ok(());
        }
    }

    if raw.is_none() && !spec.nullable {
        return Err(format!("passenger {id}: missing value for `{}`", spec.name));
    }
    let invalid = |value: &str| format!("passenger {id}: invalid {} `{value}`", spec.name);

    match column {
        Column::Int(values) => {
            let parsed = raw
                .map(|v| parse_int(v).ok_or_else(|| invalid(v)))
                .transpose()?;
            if spec.name == columns::SURVIVED {
                if let Some(label) = parsed.filter(|l| !LABELS.contains(l)) {
                    return Err(format!("passenger {id}: label {label} is not 0 or 1"));
                }
            }
            values.push(parsed);
        }
        Column::Float(values) => {
            let parsed = raw
                .map(|v| {
                    let value = v.parse::<f64>().ok().filter(|f| !f.is_nan());
                    value.ok_or_else(|| invalid(v))
                })
                .transpose()?;
            values.push(parsed);
        }
        Column::Text(values) => values.push(raw.map(str::to_string)),
    }
    Ok(())
}

/// Integers written as `3` or `3.0` are both accepted.
fn parse_int(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        let f = value.parse::<f64>().ok()?;
        (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
    })
}
