//! Tabular survey point datasets. Each row carries two projected coordinates
//! (survey feet) plus free-form descriptive columns; rows with missing or
//! non-numeric coordinates are dropped and reported rather than failing the
//! whole table.

use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result, bail};

/// Column names used to locate the coordinate and key fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointColumns {
    pub x: String,
    pub y: String,
    /// Column whose value identifies the record's detail content.
    pub key: Option<String>,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            x: "x".to_string(),
            y: "y".to_string(),
            key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    /// 1-based line in the source, header included.
    pub line: u64,
    pub x: f64,
    pub y: f64,
    pub key: Option<String>,
    /// Every non-coordinate column in header order.
    pub fields: Vec<(String, String)>,
}

impl PointRow {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PointTable {
    pub headers: Vec<String>,
    pub rows: Vec<PointRow>,
    pub skipped: Vec<SkippedRow>,
}

impl PointTable {
    pub fn open(path: &Path, columns: &PointColumns) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening point table {}", path.display()))?;
        Self::from_reader(file, columns)
            .with_context(|| format!("reading point table {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, columns: &PointColumns) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .context("reading header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let x_index = column_index(&headers, &columns.x)?;
        let y_index = column_index(&headers, &columns.y)?;
        let key_index = match columns.key.as_deref() {
            Some(name) => Some(column_index(&headers, name)?),
            None => None,
        };

        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        for (ordinal, record) in reader.records().enumerate() {
            // Header occupies line 1.
            let fallback_line = ordinal as u64 + 2;
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    let line = err
                        .position()
                        .map(|position| position.line())
                        .unwrap_or(fallback_line);
                    log::warn!("skipping unreadable row at line {line}: {err}");
                    skipped.push(SkippedRow {
                        line,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let line = record
                .position()
                .map(|position| position.line())
                .unwrap_or(fallback_line);

            let x = parse_coordinate(record.get(x_index));
            let y = parse_coordinate(record.get(y_index));
            let (x, y) = match (x, y) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    let reason = format!(
                        "non-numeric coordinates ({:?}, {:?})",
                        record.get(x_index).unwrap_or(""),
                        record.get(y_index).unwrap_or("")
                    );
                    log::warn!("skipping row at line {line}: {reason}");
                    skipped.push(SkippedRow { line, reason });
                    continue;
                }
            };

            let key = key_index
                .and_then(|index| record.get(index))
                .filter(|value| !value.is_empty())
                .map(str::to_string);

            let fields = headers
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != x_index && *index != y_index)
                .map(|(index, name)| {
                    (
                        name.clone(),
                        record.get(index).unwrap_or_default().to_string(),
                    )
                })
                .collect();

            rows.push(PointRow {
                line,
                x,
                y,
                key,
                fields,
            });
        }

        Ok(Self {
            headers,
            rows,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    match headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
    {
        Some(index) => Ok(index),
        None => bail!("missing column '{name}' (have: {})", headers.join(", ")),
    }
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str, columns: &PointColumns) -> PointTable {
        PointTable::from_reader(input.as_bytes(), columns).expect("table parses")
    }

    #[test]
    fn parses_coordinates_and_descriptive_fields() {
        let table = read(
            "id,x,y,name\nw-1,6012345.5,2101000.25,North Well\nw-2,6012400,2101100,South Well\n",
            &PointColumns {
                key: Some("id".to_string()),
                ..PointColumns::default()
            },
        );

        assert_eq!(table.len(), 2);
        assert!(table.skipped.is_empty());
        let first = &table.rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.x, 6012345.5);
        assert_eq!(first.y, 2101000.25);
        assert_eq!(first.key.as_deref(), Some("w-1"));
        assert_eq!(first.field("name"), Some("North Well"));
        assert_eq!(first.field("x"), None, "coordinates are not descriptive fields");
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let table = read(
            "x,y,label\n1,2,ok\nabc,2,bad\n3,,empty\n4,5,ok\n",
            &PointColumns::default(),
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped.len(), 2);
        assert_eq!(table.skipped[0].line, 3);
        assert_eq!(table.skipped[1].line, 4);
        assert_eq!(table.rows[1].x, 4.0);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let table = read("x,y\nNaN,1\ninf,2\n1,2\n", &PointColumns::default());
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped.len(), 2);
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let table = read(
            "Easting,Northing\n10,20\n",
            &PointColumns {
                x: "easting".to_string(),
                y: "NORTHING".to_string(),
                key: None,
            },
        );
        assert_eq!(table.rows[0].x, 10.0);
        assert_eq!(table.rows[0].y, 20.0);
    }

    #[test]
    fn missing_coordinate_column_is_an_error() {
        let err = PointTable::from_reader("a,b\n1,2\n".as_bytes(), &PointColumns::default())
            .expect_err("x column is absent");
        assert!(err.to_string().contains("missing column 'x'"));
    }
}
