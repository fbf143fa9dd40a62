//! Human-readable rendering for command results.
//!
//! Data goes to stdout; progress and status chatter go to stderr so `--json`
//! output stays machine-readable.

use anyhow::Result;
use ato_engine::{PhaseClassification, PollError, PollProgress};
use ato_types::{CredentialProfile, ExecutionResult, Mapping, TestPlan, TestPlanSummary, result_status};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::import::ImportSummary;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print `value` as pretty JSON, or hand it to `render` for the text form.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, render: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }
}

pub fn info(message: impl AsRef<str>) {
    eprintln!("{}", message.as_ref());
}

pub fn success(message: impl AsRef<str>) {
    eprintln!("✓ {}", message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    eprintln!("! {}", message.as_ref());
}

pub fn failure(message: impl AsRef<str>) {
    eprintln!("✗ {}", message.as_ref());
}

/// Prints a line whenever the observed status tag changes.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    last_status: Option<String>,
}

impl ProgressPrinter {
    pub fn observe(&mut self, progress: &PollProgress<'_>) {
        if progress.classification != PhaseClassification::Continue {
            return;
        }
        if self.last_status.as_deref() == Some(progress.status) {
            return;
        }
        eprintln!("  {} {} (check #{})", progress.phase, progress.status, progress.attempt);
        self.last_status = Some(progress.status.to_string());
    }
}

/// Counts used for the closing line of discovery and execution reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub components: usize,
    pub available_tests: usize,
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
}

impl PlanSummary {
    pub fn from_plan(plan: &TestPlan) -> Self {
        let mut summary = Self {
            components: plan.plan_components.len(),
            ..Self::default()
        };
        for component in &plan.plan_components {
            summary.available_tests += component.available_tests.len();
            for result in &component.execution_results {
                summary.executed += 1;
                if is_pass(&result.status) {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

fn is_pass(status: &str) -> bool {
    status.eq_ignore_ascii_case(result_status::SUCCESS) || status.eq_ignore_ascii_case(result_status::PASSED)
}

fn status_badge(status: &str) -> &'static str {
    if is_pass(status) { "PASS" } else { "FAIL" }
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(|ts| ts.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "-".to_string())
}

fn or_id<'a>(name: Option<&'a str>, id: &'a str) -> &'a str {
    name.filter(|name| !name.trim().is_empty()).unwrap_or(id)
}

fn print_plan_header(plan: &TestPlan) {
    println!("Test plan: {} ({})", plan.name, plan.id);
    println!("Status:    {}", plan.status);
    if let Some(reason) = plan.failure_reason.as_deref()
        && !reason.trim().is_empty()
    {
        println!("Reason:    {reason}");
    }
}

pub fn print_discovery(plan: &TestPlan) {
    print_plan_header(plan);
    println!();
    for component in &plan.plan_components {
        let name = or_id(component.component_name.as_deref(), &component.component_id);
        println!("  {name} [{}]", component.component_id);
        if component.available_tests.is_empty() {
            println!("      (no tests mapped)");
        }
        for test in &component.available_tests {
            println!("      - {} [{}]", or_id(test.name.as_deref(), &test.id), test.id);
        }
    }
    let summary = PlanSummary::from_plan(plan);
    println!();
    println!(
        "Discovered {} component(s) with {} available test(s).",
        summary.components, summary.available_tests
    );
}

pub fn print_execution(plan: &TestPlan) {
    print_plan_header(plan);
    println!();
    for component in &plan.plan_components {
        let component_name = or_id(component.component_name.as_deref(), &component.component_id);
        for result in &component.execution_results {
            let test_name = or_id(result.test_component_name.as_deref(), &result.test_component_id);
            println!("  [{}] {component_name} -> {test_name}", status_badge(&result.status));
            if !is_pass(&result.status)
                && let Some(message) = result.message.as_deref()
            {
                println!("         {message}");
            }
        }
    }
    let summary = PlanSummary::from_plan(plan);
    println!();
    println!(
        "Executed {} test(s): {} passed, {} failed.",
        summary.executed, summary.passed, summary.failed
    );
}

pub fn print_plan_details(plan: &TestPlan) {
    let summary = PlanSummary::from_plan(plan);
    if summary.executed > 0 {
        print_execution(plan);
    } else {
        print_discovery(plan);
    }
    println!("Created:   {}", timestamp(plan.created_at));
    println!("Updated:   {}", timestamp(plan.updated_at));
}

pub fn print_plan_list(plans: &[TestPlanSummary]) {
    if plans.is_empty() {
        warning("No test plans found.");
        return;
    }
    println!("{:<38} {:<20} {:<17} NAME", "ID", "STATUS", "UPDATED");
    for plan in plans {
        println!("{:<38} {:<20} {:<17} {}", plan.id, plan.status, timestamp(plan.updated_at), plan.name);
    }
}

pub fn print_wait_outcome(plan_id: &str, outcome: &Result<TestPlan, PollError>) {
    match outcome {
        Ok(plan) => println!("{plan_id}: {}", plan.status),
        Err(error) => println!("{plan_id}: {error}"),
    }
}

pub fn print_results(results: &[ExecutionResult], verbose: bool) {
    if results.is_empty() {
        warning("No results found.");
        return;
    }
    for result in results {
        let plan = or_id(result.test_plan_name.as_deref(), &result.test_plan_id);
        let component = or_id(result.component_name.as_deref(), &result.plan_component_id);
        let test = or_id(result.test_component_name.as_deref(), &result.test_component_id);
        println!(
            "[{}] {plan} / {component} -> {test} ({})",
            status_badge(&result.status),
            timestamp(result.executed_at)
        );
        if !verbose || is_pass(&result.status) {
            continue;
        }
        if let Some(message) = result.message.as_deref() {
            println!("      {message}");
        }
        for case in result.test_cases.iter().filter(|case| !is_pass(&case.status)) {
            println!("      - {}: {}", case.test_description, case.details.as_deref().unwrap_or("no details"));
        }
    }
    let passed = results.iter().filter(|result| is_pass(&result.status)).count();
    println!();
    println!("{} result(s): {passed} passed, {} failed.", results.len(), results.len() - passed);
}

pub fn print_credentials(profiles: &[CredentialProfile]) {
    if profiles.is_empty() {
        warning("No credential profiles found.");
        return;
    }
    println!("{:<24} {:<24} {:<32} EXECUTION INSTANCE", "PROFILE", "ACCOUNT", "USERNAME");
    for profile in profiles {
        let credentials = &profile.credentials;
        println!(
            "{:<24} {:<24} {:<32} {}",
            profile.profile_name, credentials.account_id, credentials.username, credentials.execution_instance_id
        );
    }
}

pub fn print_mappings(mappings: &[Mapping]) {
    if mappings.is_empty() {
        warning("No mappings found.");
        return;
    }
    for mapping in mappings {
        let main = or_id(mapping.main_component_name.as_deref(), &mapping.main_component_id);
        let test = or_id(mapping.test_component_name.as_deref(), &mapping.test_component_id);
        println!("{}  {main} -> {test}", mapping.id);
    }
}

pub fn print_import_summary(summary: &ImportSummary) {
    println!("Imported {} of {} mapping(s).", summary.imported, summary.attempted());
    if !summary.skipped_lines.is_empty() {
        println!("Skipped {} row(s) with a missing ID.", summary.skipped_lines.len());
    }
    if !summary.failures.is_empty() {
        println!("Failed to import {} mapping(s):", summary.failures.len());
        for failure in &summary.failures {
            println!("  row {}: {}", failure.line, failure.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_types::{AvailableTest, PlanComponent, TestExecutionResult};

    fn component(id: &str, tests: &[&str], results: &[&str]) -> PlanComponent {
        PlanComponent {
            id: format!("pc-{id}"),
            test_plan_id: "p1".into(),
            component_id: id.into(),
            component_name: None,
            component_type: None,
            available_tests: tests
                .iter()
                .map(|test| AvailableTest {
                    id: (*test).into(),
                    name: None,
                })
                .collect(),
            execution_results: results
                .iter()
                .enumerate()
                .map(|(index, status)| TestExecutionResult {
                    id: format!("r{index}"),
                    test_component_id: format!("t{index}"),
                    test_component_name: None,
                    status: (*status).into(),
                    message: None,
                    test_cases: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn summary_counts_tests_and_outcomes() {
        let mut plan = TestPlan::with_status("p1", "COMPLETED");
        plan.plan_components = vec![
            component("c1", &["t1", "t2"], &["SUCCESS", "FAILURE"]),
            component("c2", &["t3"], &["SUCCESS"]),
            component("c3", &[], &[]),
        ];

        assert_eq!(
            PlanSummary::from_plan(&plan),
            PlanSummary {
                components: 3,
                available_tests: 3,
                executed: 3,
                passed: 2,
                failed: 1,
            }
        );
    }

    #[test]
    fn summary_of_empty_plan_is_zero() {
        let plan = TestPlan::with_status("p1", "AWAITING_SELECTION");
        assert_eq!(PlanSummary::from_plan(&plan), PlanSummary::default());
    }

    #[test]
    fn blank_names_fall_back_to_ids() {
        assert_eq!(or_id(Some("  "), "c1"), "c1");
        assert_eq!(or_id(None, "c1"), "c1");
        assert_eq!(or_id(Some("Orders"), "c1"), "Orders");
    }

    #[test]
    fn passed_variants_are_case_insensitive() {
        assert!(is_pass("success"));
        assert!(is_pass("PASSED"));
        assert!(!is_pass("FAILURE"));
        assert!(!is_pass("ERROR"));
    }
}
