//! `mappings import`: one create request per CSV row, failures counted without
//! stopping the batch.

use anyhow::{Result, bail};
use ato_api::OrchestratorClient;
use ato_util::mapping_csv::MappingRow;
use serde::Serialize;
use tracing::debug;

use crate::report;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub line: u64,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_lines: Vec<u64>,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    pub fn attempted(&self) -> usize {
        self.imported + self.failures.len()
    }

    /// Error when any row was rejected, so the process exits non-zero.
    pub fn ensure_complete(&self) -> Result<()> {
        if !self.failures.is_empty() {
            bail!("failed to import {} of {} mapping(s)", self.failures.len(), self.attempted());
        }
        Ok(())
    }
}

pub async fn import_mappings(client: &OrchestratorClient, rows: &[MappingRow], skipped_lines: Vec<u64>) -> ImportSummary {
    let mut summary = ImportSummary {
        skipped_lines,
        ..ImportSummary::default()
    };

    for (index, row) in rows.iter().enumerate() {
        debug!(
            line = row.line,
            main_component_id = %row.request.main_component_id,
            test_component_id = %row.request.test_component_id,
            "importing mapping {} of {}",
            index + 1,
            rows.len()
        );
        match client.create_mapping(&row.request).await {
            Ok(_) => summary.imported += 1,
            Err(error) => {
                report::failure(format!("Failed to import row {}: {error}", row.line));
                summary.failures.push(RowFailure {
                    line: row.line,
                    error: error.to_string(),
                });
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_api::ClientConfig;
    use ato_util::mapping_csv::parse_mapping_csv;
    use httptest::{Expectation, Server, cycle, matchers::*, responders::*};
    use serde_json::json;

    fn mapping(id: &str, main: &str, test: &str) -> serde_json::Value {
        json!({ "data": { "id": id, "mainComponentId": main, "testComponentId": test } })
    }

    #[tokio::test]
    async fn rejected_row_is_counted_and_the_batch_continues() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/api/v1/mappings"))
                .times(3)
                .respond_with(cycle![
                    status_code(201).body(mapping("m1", "c1", "t1").to_string()),
                    status_code(409).body(r#"{"metadata":{"message":"Mapping already exists"}}"#),
                    status_code(201).body(mapping("m3", "c3", "t3").to_string()),
                ]),
        );
        let client = OrchestratorClient::new(ClientConfig::new(&server.url_str("/api/v1")).unwrap()).unwrap();

        let parsed = parse_mapping_csv("mainComponentId,testComponentId\nc1,t1\nc2,t2\n,t9\nc3,t3\n".as_bytes()).unwrap();
        let summary = import_mappings(&client, &parsed.rows, parsed.skipped).await;

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped_lines, vec![4]);
        assert_eq!(
            summary.failures,
            vec![RowFailure {
                line: 3,
                error: "API Error (Status 409): Mapping already exists".into(),
            }]
        );
        assert_eq!(
            summary.ensure_complete().unwrap_err().to_string(),
            "failed to import 1 of 3 mapping(s)"
        );
    }

    #[test]
    fn clean_import_is_complete() {
        let summary = ImportSummary {
            imported: 4,
            ..ImportSummary::default()
        };
        assert!(summary.ensure_complete().is_ok());
    }
}
