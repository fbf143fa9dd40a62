//! Typed endpoint methods for the orchestration API.

use ato_types::{
    AddCredentialRequest, ApiEnvelope, CreateMappingRequest, CreatedResource, CredentialProfile, ExecutionResult,
    InitiateDiscoveryRequest, InitiateExecutionRequest, Mapping, ResultFilters, TestPlan, TestPlanSummary,
};
use ato_util::{encode_path_segment, redact_sensitive};
use reqwest::{Method, StatusCode};
use tracing::{debug, info};

use crate::{ClientError, OrchestratorClient};

impl OrchestratorClient {
    /// `GET /test-plans`
    pub async fn list_plans(&self) -> Result<Vec<TestPlanSummary>, ClientError> {
        let envelope: ApiEnvelope<Vec<TestPlanSummary>> = self.execute_json(Method::GET, "/test-plans", &[StatusCode::OK], |b| b).await?;
        Ok(envelope.data)
    }

    /// `GET /test-plans/{id}`; the status snapshot consumed by the poller.
    pub async fn get_plan(&self, plan_id: &str) -> Result<TestPlan, ClientError> {
        let path = format!("/test-plans/{}", encode_path_segment(plan_id));
        let envelope: ApiEnvelope<TestPlan> = self.execute_json(Method::GET, &path, &[StatusCode::OK], |b| b).await?;
        Ok(envelope.data)
    }

    /// `DELETE /test-plans/{id}`
    pub async fn delete_plan(&self, plan_id: &str) -> Result<(), ClientError> {
        let path = format!("/test-plans/{}", encode_path_segment(plan_id));
        self.execute(Method::DELETE, &path, &[StatusCode::NO_CONTENT], |b| b).await?;
        info!(plan_id = %plan_id, "test plan deleted");
        Ok(())
    }

    /// `POST /test-plans`; returns the id of the newly created plan.
    pub async fn initiate_discovery(&self, request: &InitiateDiscoveryRequest) -> Result<String, ClientError> {
        debug!(
            name = %request.name,
            plan_type = %request.plan_type,
            inputs = request.input_count(),
            discover_dependencies = request.discover_dependencies,
            "initiating discovery"
        );
        let envelope: ApiEnvelope<CreatedResource> = self
            .execute_json(Method::POST, "/test-plans", &[StatusCode::CREATED, StatusCode::ACCEPTED], |b| b.json(request))
            .await?;
        info!(plan_id = %envelope.data.id, "discovery initiated");
        Ok(envelope.data.id)
    }

    /// `POST /test-plans/{id}/execute`; returns the plan id execution was started for.
    pub async fn initiate_execution(&self, plan_id: &str, request: &InitiateExecutionRequest) -> Result<String, ClientError> {
        let path = format!("/test-plans/{}/execute", encode_path_segment(plan_id));
        debug!(plan_id = %plan_id, selected_tests = request.tests_to_run.len(), "initiating execution");
        self.execute(Method::POST, &path, &[StatusCode::OK, StatusCode::ACCEPTED], |b| b.json(request))
            .await?;
        info!(plan_id = %plan_id, "execution initiated");
        Ok(plan_id.to_string())
    }

    /// `GET /test-execution-results` with optional filters.
    pub async fn list_results(&self, filters: &ResultFilters) -> Result<Vec<ExecutionResult>, ClientError> {
        let query = filters.query_pairs();
        let envelope: ApiEnvelope<Vec<ExecutionResult>> = self
            .execute_json(Method::GET, "/test-execution-results", &[StatusCode::OK], |b| {
                if query.is_empty() { b } else { b.query(&query) }
            })
            .await?;
        Ok(envelope.data)
    }

    /// `GET /credentials`
    pub async fn list_credentials(&self) -> Result<Vec<CredentialProfile>, ClientError> {
        let envelope: ApiEnvelope<Vec<CredentialProfile>> = self.execute_json(Method::GET, "/credentials", &[StatusCode::OK], |b| b).await?;
        Ok(envelope.data)
    }

    /// `POST /credentials`
    pub async fn add_credential(&self, request: &AddCredentialRequest) -> Result<(), ClientError> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload = serde_json::to_string(request).unwrap_or_default();
            debug!(payload = %redact_sensitive(&payload), "adding credential profile");
        }
        self.execute(Method::POST, "/credentials", &[StatusCode::CREATED], |b| b.json(request))
            .await?;
        Ok(())
    }

    /// `DELETE /credentials/{profile}`
    pub async fn delete_credential(&self, profile_name: &str) -> Result<(), ClientError> {
        let path = format!("/credentials/{}", encode_path_segment(profile_name));
        self.execute(Method::DELETE, &path, &[StatusCode::NO_CONTENT], |b| b).await?;
        Ok(())
    }

    /// `GET /mappings`
    pub async fn list_mappings(&self) -> Result<Vec<Mapping>, ClientError> {
        let envelope: ApiEnvelope<Vec<Mapping>> = self.execute_json(Method::GET, "/mappings", &[StatusCode::OK], |b| b).await?;
        Ok(envelope.data)
    }

    /// `POST /mappings`
    pub async fn create_mapping(&self, request: &CreateMappingRequest) -> Result<Mapping, ClientError> {
        let envelope: ApiEnvelope<Mapping> = self
            .execute_json(Method::POST, "/mappings", &[StatusCode::CREATED], |b| b.json(request))
            .await?;
        Ok(envelope.data)
    }

    /// `DELETE /mappings/{id}`
    pub async fn delete_mapping(&self, mapping_id: &str) -> Result<(), ClientError> {
        let path = format!("/mappings/{}", encode_path_segment(mapping_id));
        self.execute(Method::DELETE, &path, &[StatusCode::NO_CONTENT], |b| b).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httptest::{Expectation, Server, all_of, matchers::*, responders::*};
    use serde_json::json;

    use crate::{ClientConfig, ClientError, NetworkErrorKind, OrchestratorClient};
    use ato_types::{InitiateDiscoveryRequest, InitiateExecutionRequest, ResultFilters};
    use ato_util::http::NO_ERROR_DETAILS;

    fn client_for(server: &Server) -> OrchestratorClient {
        let config = ClientConfig::new(&server.url_str("/api/v1")).unwrap();
        OrchestratorClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn get_plan_unwraps_data_envelope() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/v1/test-plans/p1")).respond_with(json_encoded(json!({
                "data": { "id": "p1", "name": "nightly", "status": "DISCOVERING" }
            }))),
        );

        let plan = client_for(&server).get_plan("p1").await.unwrap();
        assert_eq!(plan.id, "p1");
        assert_eq!(plan.status, "DISCOVERING");
    }

    #[tokio::test]
    async fn not_found_with_structured_body_becomes_api_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/v1/test-plans/missing"))
                .respond_with(status_code(404).body(r#"{"metadata":{"message":"not found"}}"#)),
        );

        let error = client_for(&server).get_plan("missing").await.unwrap_err();
        match error {
            ClientError::Api { status_code, message } => {
                assert_eq!(status_code, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn not_found_with_empty_body_uses_placeholder() {
        let server = Server::run();
        server.expect(Expectation::matching(request::method_path("GET", "/api/v1/test-plans/missing")).respond_with(status_code(404)));

        let error = client_for(&server).get_plan("missing").await.unwrap_err();
        assert!(matches!(
            error,
            ClientError::Api { status_code: 404, ref message } if message == NO_ERROR_DETAILS
        ));
    }

    #[tokio::test]
    async fn connection_refused_is_classified() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::new(&format!("http://{address}/api/v1")).unwrap();
        let client = OrchestratorClient::new(config).unwrap();
        let error = client.get_plan("p1").await.unwrap_err();

        assert!(
            matches!(
                error,
                ClientError::Network {
                    kind: NetworkErrorKind::ConnectionRefused,
                    ..
                }
            ),
            "unexpected error: {error:?}"
        );
    }

    #[tokio::test]
    async fn connection_refused_over_https_is_classified() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::new(&format!("https://127.0.0.1:{port}/api/v1")).unwrap();
        let client = OrchestratorClient::new(config).unwrap();
        let error = client.get_plan("p1").await.unwrap_err();

        assert!(error.is_connection_refused(), "unexpected error: {error:?}");
    }

    #[tokio::test]
    async fn initiate_discovery_posts_payload_and_returns_id() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/api/v1/test-plans"),
                request::body(json_decoded(eq(json!({
                    "name": "smoke",
                    "planType": "COMPONENT",
                    "componentIds": ["c1", "c2"],
                    "credentialProfile": "dev",
                    "discoverDependencies": true
                })))),
            ])
            .respond_with(status_code(202).body(r#"{"data":{"id":"p9","status":"DISCOVERING"}}"#)),
        );

        let request = InitiateDiscoveryRequest {
            name: "smoke".into(),
            component_ids: vec!["c1".into(), "c2".into()],
            credential_profile: "dev".into(),
            discover_dependencies: true,
            ..Default::default()
        };
        let plan_id = client_for(&server).initiate_discovery(&request).await.unwrap();
        assert_eq!(plan_id, "p9");
    }

    #[tokio::test]
    async fn initiate_discovery_rejects_unexpected_success_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/api/v1/test-plans"))
                .respond_with(status_code(200).body(r#"{"data":{"id":"p9"}}"#)),
        );

        let error = client_for(&server)
            .initiate_discovery(&InitiateDiscoveryRequest::default())
            .await
            .unwrap_err();
        assert_eq!(error.status_code(), Some(200));
    }

    #[tokio::test]
    async fn initiate_execution_accepts_ok_and_accepted() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/api/v1/test-plans/p1/execute"),
                request::body(json_decoded(eq(json!({ "testsToRun": ["t1"], "credentialProfile": "dev" })))),
            ])
            .respond_with(status_code(202).body(r#"{"data":{"id":"p1","status":"EXECUTING"}}"#)),
        );

        let request = InitiateExecutionRequest {
            tests_to_run: vec!["t1".into()],
            credential_profile: "dev".into(),
        };
        let plan_id = client_for(&server).initiate_execution("p1", &request).await.unwrap();
        assert_eq!(plan_id, "p1");
    }

    #[tokio::test]
    async fn success_body_that_is_not_json_is_a_decode_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/v1/test-plans")).respond_with(status_code(200).body("<html></html>")),
        );

        let error = client_for(&server).list_plans().await.unwrap_err();
        assert!(matches!(error, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn list_results_sends_only_set_filters() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/v1/test-execution-results"),
                request::query(url_decoded(contains(("testPlanId", "p1")))),
                request::query(url_decoded(not(contains(key("status"))))),
            ])
            .respond_with(json_encoded(json!({ "data": [] }))),
        );

        let filters = ResultFilters {
            test_plan_id: Some("p1".into()),
            ..Default::default()
        };
        let results = client_for(&server).list_results(&filters).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn delete_credential_encodes_profile_name() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/api/v1/credentials/dev%20eu")).respond_with(status_code(204)),
        );

        client_for(&server).delete_credential("dev eu").await.unwrap();
    }

    #[tokio::test]
    async fn delete_plan_requires_no_content() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/api/v1/test-plans/p1"))
                .respond_with(status_code(500).body("database unavailable")),
        );

        let error = client_for(&server).delete_plan("p1").await.unwrap_err();
        assert_eq!(error.to_string(), "API Error (Status 500): database unavailable");
    }
}
