use std::fs::File;

use anyhow::{Context, Result, anyhow, bail};
use ato_api::OrchestratorClient;
use ato_engine::{Phase, PlanPoller, PollError};
use ato_types::{AddCredentialRequest, CreateMappingRequest, InitiateDiscoveryRequest, InitiateExecutionRequest, ResultFilters};
use ato_util::mapping_csv::parse_mapping_csv;
use serde_json::json;
use tracing::debug;

use crate::args::{AddCredentialArgs, Command, CredsCommand, DiscoverArgs, ExecuteArgs, MappingsCommand, ResultsArgs, TestPlansCommand};
use crate::import;
use crate::report::{self, Output, ProgressPrinter};

pub async fn dispatch(client: &OrchestratorClient, command: Command, output: Output) -> Result<()> {
    debug!(base_url = %client.base_url(), "dispatching command");
    match command {
        Command::Discover(args) => discover(client, args, output).await,
        Command::Execute(args) => execute(client, args, output).await,
        Command::TestPlans(command) => test_plans(client, command, output).await,
        Command::Results(args) => results(client, args, output).await,
        Command::Creds(command) => creds(client, command, output).await,
        Command::Mappings(command) => mappings(client, command, output).await,
    }
}

async fn discover(client: &OrchestratorClient, args: DiscoverArgs, output: Output) -> Result<()> {
    let request = InitiateDiscoveryRequest {
        name: args.plan_name,
        plan_type: args.plan_type,
        component_ids: args.ids,
        component_names: args.names,
        folder_names: args.folders,
        credential_profile: args.creds,
        discover_dependencies: args.dependencies,
    };
    if request.input_count() == 0 {
        report::warning("No IDs, names, or folders provided. Nothing to discover.");
        return Ok(());
    }

    report::info(format!(
        "Creating {} test plan \"{}\" from {} input(s)...",
        request.plan_type,
        request.name,
        request.input_count()
    ));
    let plan_id = client.initiate_discovery(&request).await.context("failed to initiate discovery")?;
    report::info(format!("Test plan created (ID: {plan_id}). Waiting for component discovery..."));

    let settings = args.poll.settings(Phase::Discovery);
    let mut progress = ProgressPrinter::default();
    let plan = PlanPoller::new(client)
        .poll_with_observer(Phase::Discovery, &plan_id, &settings, |step| progress.observe(step))
        .await
        .map_err(|error| poll_failure("Test plan creation failed.", error))?;

    report::success("Discovery complete.");
    output.emit(&plan, report::print_discovery)
}

async fn execute(client: &OrchestratorClient, args: ExecuteArgs, output: Output) -> Result<()> {
    let tests_to_run: Vec<String> = args
        .tests
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let scope = if tests_to_run.is_empty() {
        "all available tests".to_string()
    } else {
        format!("{} selected test(s)", tests_to_run.len())
    };
    let request = InitiateExecutionRequest {
        tests_to_run,
        credential_profile: args.creds,
    };

    report::info(format!("Initiating execution of {scope} for plan {}...", args.plan_id));
    let plan_id = client
        .initiate_execution(&args.plan_id, &request)
        .await
        .context("failed to initiate execution")?;
    report::info("Execution started. Waiting for results...");

    let settings = args.poll.settings(Phase::Execution);
    let mut progress = ProgressPrinter::default();
    let plan = PlanPoller::new(client)
        .poll_with_observer(Phase::Execution, &plan_id, &settings, |step| progress.observe(step))
        .await
        .map_err(|error| poll_failure("Execution failed.", error))?;

    report::success("Execution complete.");
    output.emit(&plan, report::print_execution)
}

async fn test_plans(client: &OrchestratorClient, command: TestPlansCommand, output: Output) -> Result<()> {
    match command {
        TestPlansCommand::List => {
            let plans = client.list_plans().await.context("failed to list test plans")?;
            output.emit(&plans, |plans| report::print_plan_list(plans))
        }
        TestPlansCommand::Get { plan_id } => {
            let plan = client
                .get_plan(&plan_id)
                .await
                .with_context(|| format!("failed to fetch test plan {plan_id}"))?;
            output.emit(&plan, report::print_plan_details)
        }
        TestPlansCommand::Rm { plan_id } => {
            client
                .delete_plan(&plan_id)
                .await
                .with_context(|| format!("failed to delete test plan {plan_id}"))?;
            report::success(format!("Test plan {plan_id} deleted."));
            Ok(())
        }
        TestPlansCommand::Wait { plan_ids, phase, poll } => {
            let phase = Phase::from(phase);
            let settings = poll.settings(phase);
            report::info(format!("Waiting on {} plan(s) for {phase}...", plan_ids.len()));
            let outcomes = PlanPoller::new(client).poll_many(phase, plan_ids, &settings).await;

            let failed = outcomes.values().filter(|outcome| outcome.is_err()).count();
            if output.is_json() {
                let document: serde_json::Map<String, serde_json::Value> = outcomes
                    .iter()
                    .map(|(plan_id, outcome)| {
                        let value = match outcome {
                            Ok(plan) => json!({ "status": plan.status, "plan": plan }),
                            Err(error) => json!({
                                "status": error.last_plan().map(|plan| plan.status.as_str()),
                                "error": error.to_string(),
                            }),
                        };
                        (plan_id.clone(), value)
                    })
                    .collect();
                output.emit(&document, |_| {})?;
            } else {
                for (plan_id, outcome) in &outcomes {
                    report::print_wait_outcome(plan_id, outcome);
                }
            }

            if failed > 0 {
                bail!("{failed} of {} plan(s) did not finish {phase} successfully", outcomes.len());
            }
            Ok(())
        }
    }
}

async fn results(client: &OrchestratorClient, args: ResultsArgs, output: Output) -> Result<()> {
    let filters = ResultFilters {
        test_plan_id: args.plan_id,
        component_id: args.component_id,
        test_component_id: args.test_id,
        status: args.status,
    };
    let results = client.list_results(&filters).await.context("failed to fetch results")?;
    let verbose = args.verbose;
    output.emit(&results, |results| report::print_results(results, verbose))
}

async fn creds(client: &OrchestratorClient, command: CredsCommand, output: Output) -> Result<()> {
    match command {
        CredsCommand::List => {
            let profiles = client.list_credentials().await.context("failed to list credential profiles")?;
            output.emit(&profiles, |profiles| report::print_credentials(profiles))
        }
        CredsCommand::Add(args) => {
            let AddCredentialArgs {
                profile,
                account_id,
                username,
                password,
                execution_instance_id,
            } = args;
            let request = AddCredentialRequest {
                profile_name: profile,
                account_id,
                username,
                password_or_token: password,
                execution_instance_id,
            };
            client
                .add_credential(&request)
                .await
                .with_context(|| format!("failed to save credential profile \"{}\"", request.profile_name))?;
            report::success(format!("Profile \"{}\" has been saved.", request.profile_name));
            Ok(())
        }
        CredsCommand::Delete { profile } => {
            client
                .delete_credential(&profile)
                .await
                .with_context(|| format!("failed to delete credential profile \"{profile}\""))?;
            report::success(format!("Profile \"{profile}\" deleted."));
            Ok(())
        }
    }
}

async fn mappings(client: &OrchestratorClient, command: MappingsCommand, output: Output) -> Result<()> {
    match command {
        MappingsCommand::List => {
            let mappings = client.list_mappings().await.context("failed to list mappings")?;
            output.emit(&mappings, |mappings| report::print_mappings(mappings))
        }
        MappingsCommand::Add {
            main_id,
            main_name,
            test_id,
            test_name,
        } => {
            let request = CreateMappingRequest {
                main_component_id: main_id,
                main_component_name: main_name,
                test_component_id: test_id,
                test_component_name: test_name,
                ..Default::default()
            };
            let mapping = client.create_mapping(&request).await.context("failed to create mapping")?;
            report::success(format!("Mapping created (ID: {}).", mapping.id));
            output.emit(&mapping, |mapping| report::print_mappings(std::slice::from_ref(mapping)))
        }
        MappingsCommand::Import { from_csv } => {
            let file = File::open(&from_csv).with_context(|| format!("failed to open file {}", from_csv.display()))?;
            let parsed = parse_mapping_csv(file).context("failed to parse CSV file")?;
            for line in &parsed.skipped {
                report::warning(format!("Skipping row {line}: missing required ID"));
            }
            if parsed.rows.is_empty() {
                report::warning("No valid mappings found in the CSV file.");
                return Ok(());
            }

            report::info(format!("Importing {} mapping(s) from {}...", parsed.rows.len(), from_csv.display()));
            let summary = import::import_mappings(client, &parsed.rows, parsed.skipped).await;
            output.emit(&summary, report::print_import_summary)?;
            summary.ensure_complete()
        }
        MappingsCommand::Rm { mapping_id } => {
            client
                .delete_mapping(&mapping_id)
                .await
                .with_context(|| format!("failed to delete mapping {mapping_id}"))?;
            report::success(format!("Mapping {mapping_id} deleted."));
            Ok(())
        }
    }
}

/// Turn a poll outcome into the user-facing error, preferring the server's reason.
fn poll_failure(headline: &str, error: PollError) -> anyhow::Error {
    let reason = error
        .failure_reason()
        .filter(|reason| !reason.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    anyhow!("{headline} Reason: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_api::{ClientError, NetworkErrorKind};
    use ato_types::TestPlan;

    #[test]
    fn poll_failure_prefers_server_reason() {
        let error = PollError::OperationFailed {
            phase: Phase::Discovery,
            reason: Some("component 42 not found".into()),
            plan: Box::new(TestPlan::with_status("p1", "DISCOVERY_FAILED")),
        };
        assert_eq!(
            poll_failure("Test plan creation failed.", error).to_string(),
            "Test plan creation failed. Reason: component 42 not found"
        );
    }

    #[test]
    fn poll_failure_falls_back_to_error_text() {
        let error = PollError::Client(ClientError::network(NetworkErrorKind::ConnectionRefused, "tcp connect error"));
        let message = poll_failure("Execution failed.", error).to_string();
        assert!(message.starts_with("Execution failed. Reason: "));
        assert!(message.contains("Connection refused"), "{message}");
    }
}
