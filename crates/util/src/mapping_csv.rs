//! Bulk mapping import from CSV.
//!
//! The header row names the columns. `mainComponentId` and `testComponentId`
//! are required; `mainComponentName`, `testComponentName`, `isDeployed` and
//! `isPackage` are optional and may appear in any order.

use std::io::Read;

use ato_types::CreateMappingRequest;
use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

pub const MAIN_COMPONENT_ID: &str = "mainComponentId";
pub const TEST_COMPONENT_ID: &str = "testComponentId";

#[derive(Debug, Error)]
pub enum MappingCsvError {
    #[error("failed to read CSV data: {0}")]
    Read(#[from] csv::Error),

    #[error("CSV file is missing required header: {0}")]
    MissingHeader(&'static str),
}

/// A data row ready to be sent, tagged with its line in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub line: u64,
    pub request: CreateMappingRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMappings {
    pub rows: Vec<MappingRow>,
    /// Lines dropped because a required id was blank.
    pub skipped: Vec<u64>,
}

/// Parse mapping rows from CSV.
///
/// A file with no data rows yields an empty result without header checks.
/// Short rows are tolerated; missing optional cells read as absent.
pub fn parse_mapping_csv<R: Read>(reader: R) -> Result<ParsedMappings, MappingCsvError> {
    let mut reader = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    if records.is_empty() {
        return Ok(ParsedMappings::default());
    }

    let columns = Columns::locate(&headers)?;
    let mut parsed = ParsedMappings::default();
    for (index, record) in records.iter().enumerate() {
        let line = record.position().map(|position| position.line()).unwrap_or(index as u64 + 2);
        let (Some(main_id), Some(test_id)) = (cell(record, Some(columns.main_id)), cell(record, Some(columns.test_id))) else {
            parsed.skipped.push(line);
            continue;
        };

        parsed.rows.push(MappingRow {
            line,
            request: CreateMappingRequest {
                main_component_id: main_id.to_string(),
                main_component_name: cell(record, columns.main_name).map(str::to_string),
                test_component_id: test_id.to_string(),
                test_component_name: cell(record, columns.test_name).map(str::to_string),
                is_deployed: cell(record, columns.deployed).and_then(parse_flag),
                is_packaged: cell(record, columns.packaged).and_then(parse_flag),
            },
        });
    }
    Ok(parsed)
}

struct Columns {
    main_id: usize,
    test_id: usize,
    main_name: Option<usize>,
    test_name: Option<usize>,
    deployed: Option<usize>,
    packaged: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, MappingCsvError> {
        let position = |name: &str| headers.iter().position(|header| header == name);
        Ok(Self {
            main_id: position(MAIN_COMPONENT_ID).ok_or(MappingCsvError::MissingHeader(MAIN_COMPONENT_ID))?,
            test_id: position(TEST_COMPONENT_ID).ok_or(MappingCsvError::MissingHeader(TEST_COMPONENT_ID))?,
            main_name: position("mainComponentName"),
            test_name: position("testComponentName"),
            deployed: position("isDeployed"),
            packaged: position("isPackage").or_else(|| position("isPackaged")),
        })
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index.and_then(|index| record.get(index)).filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ParsedMappings, MappingCsvError> {
        parse_mapping_csv(text.as_bytes())
    }

    #[test]
    fn reads_required_and_optional_columns() {
        let parsed = parse(
            "testComponentId,mainComponentId,testComponentName,isDeployed,isPackage\n\
             t1,c1,\"Orders, smoke\",TRUE,0\n\
             t2,c2,,yes,\n",
        )
        .unwrap();

        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.rows.len(), 2);

        let first = &parsed.rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.request.main_component_id, "c1");
        assert_eq!(first.request.test_component_id, "t1");
        assert_eq!(first.request.test_component_name.as_deref(), Some("Orders, smoke"));
        assert_eq!(first.request.is_deployed, Some(true));
        assert_eq!(first.request.is_packaged, Some(false));

        let second = &parsed.rows[1];
        assert_eq!(second.request.test_component_name, None);
        assert_eq!(second.request.is_deployed, None);
        assert_eq!(second.request.is_packaged, None);
    }

    #[test]
    fn rows_with_blank_ids_are_skipped_by_line() {
        let parsed = parse("mainComponentId,testComponentId\nc1,t1\n  ,t2\nc3\nc4,t4\n").unwrap();

        let lines: Vec<u64> = parsed.rows.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![2, 5]);
        assert_eq!(parsed.skipped, vec![3, 4]);
    }

    #[test]
    fn missing_required_header_is_an_error() {
        let error = parse("mainComponentId,testName\nc1,t1\n").unwrap_err();
        assert!(matches!(error, MappingCsvError::MissingHeader(TEST_COMPONENT_ID)));
        assert_eq!(error.to_string(), "CSV file is missing required header: testComponentId");
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert_eq!(parse("mainComponentId,testComponentId\n").unwrap(), ParsedMappings::default());
        assert_eq!(parse("").unwrap(), ParsedMappings::default());
    }
}
