//! Command-line surface.

use std::path::PathBuf;
use std::time::Duration;

use ato_api::DEFAULT_BASE_URL;
use ato_engine::{Phase, PollSettings};
use ato_types::PlanType;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "ato",
    version,
    about = "Automated Test Orchestrator",
    long_about = "A command-line interface to interact with the Automated Test Orchestrator API."
)]
pub struct Cli {
    /// Base URL for the Orchestrator API
    #[arg(long, global = true, env = "ATO_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "ato_engine=debug")
    #[arg(long, global = true, env = "ATO_LOG", default_value = "warn")]
    pub log_level: String,

    /// Print raw JSON payloads instead of text summaries
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new test plan and wait for component discovery
    Discover(DiscoverArgs),
    /// Execute a selected set of tests from a test plan and wait for results
    Execute(ExecuteArgs),
    /// Manage and view test plans
    #[command(name = "test-plans", visible_alias = "tp", subcommand)]
    TestPlans(TestPlansCommand),
    /// Query test execution results with optional filters
    Results(ResultsArgs),
    /// Manage credential profiles
    #[command(subcommand)]
    Creds(CredsCommand),
    /// Manage component-to-test mappings
    #[command(subcommand)]
    Mappings(MappingsCommand),
}

/// Poll tuning shared by every command that waits on a plan.
#[derive(Debug, Clone, Args)]
pub struct PollArgs {
    /// Seconds between status checks [default: 2 for discovery, 3 for execution]
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Stop after this many status checks [default: wait until the plan finishes]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,
}

impl PollArgs {
    pub fn settings(&self, phase: Phase) -> PollSettings {
        let settings = PollSettings::for_phase(phase).with_max_attempts(self.max_attempts);
        match self.poll_interval {
            Some(seconds) => settings.with_interval(Duration::from_secs(seconds)),
            None => settings,
        }
    }
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// A descriptive name for the test plan
    #[arg(short = 'p', long)]
    pub plan_name: String,

    /// Plan mode: COMPONENT or TEST
    #[arg(short = 't', long = "type", default_value = "COMPONENT", value_parser = parse_plan_type)]
    pub plan_type: PlanType,

    /// ID of a component or test to include (repeatable)
    #[arg(short = 'i', long = "ids", value_name = "ID")]
    pub ids: Vec<String>,

    /// Name of a component or test to resolve (repeatable)
    #[arg(short = 'n', long = "names", value_name = "NAME")]
    pub names: Vec<String>,

    /// Name of a folder to scan for components or tests (repeatable)
    #[arg(short = 'F', long = "folders", value_name = "FOLDER")]
    pub folders: Vec<String>,

    /// Discover all dependencies of the provided components
    #[arg(short = 'd', long)]
    pub dependencies: bool,

    /// Name of the credential profile to use
    #[arg(short = 'c', long)]
    pub creds: String,

    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(Debug, Args)]
pub struct ExecuteArgs {
    /// Test plan ID from the discovery phase
    #[arg(short = 'p', long = "plan-id", visible_alias = "planId")]
    pub plan_id: String,

    /// Comma-separated test component IDs to run [default: all available tests]
    #[arg(short = 't', long, value_delimiter = ',', value_name = "IDS")]
    pub tests: Vec<String>,

    /// Name of the credential profile to use
    #[arg(short = 'c', long)]
    pub creds: String,

    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(Debug, Subcommand)]
pub enum TestPlansCommand {
    /// List all test plans
    List,
    /// Get the full details of a test plan
    Get { plan_id: String },
    /// Remove a test plan and its components and results
    Rm { plan_id: String },
    /// Wait for one or more plans to finish a phase
    Wait {
        #[arg(required = true)]
        plan_ids: Vec<String>,

        /// Phase to wait on
        #[arg(long, value_enum, default_value_t = PhaseArg::Execution)]
        phase: PhaseArg,

        #[command(flatten)]
        poll: PollArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PhaseArg {
    Discovery,
    Execution,
}

impl From<PhaseArg> for Phase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Discovery => Phase::Discovery,
            PhaseArg::Execution => Phase::Execution,
        }
    }
}

#[derive(Debug, Args)]
pub struct ResultsArgs {
    /// Filter by test plan ID
    #[arg(short = 'p', long = "plan-id", visible_alias = "planId")]
    pub plan_id: Option<String>,

    /// Filter by discovered component ID
    #[arg(long = "component-id", visible_alias = "componentId")]
    pub component_id: Option<String>,

    /// Filter by test component ID
    #[arg(long = "test-id", visible_alias = "testId")]
    pub test_id: Option<String>,

    /// Filter by status (SUCCESS or FAILURE)
    #[arg(long)]
    pub status: Option<String>,

    /// Show failed test cases and their messages
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum CredsCommand {
    /// List saved credential profiles
    List,
    /// Add a credential profile
    Add(AddCredentialArgs),
    /// Delete a credential profile
    Delete { profile: String },
}

#[derive(Debug, Args)]
pub struct AddCredentialArgs {
    /// Profile name, e.g. "dev-account"
    pub profile: String,

    /// Integration platform account ID
    #[arg(long)]
    pub account_id: String,

    /// Integration platform username
    #[arg(long)]
    pub username: String,

    /// Integration platform password or token
    #[arg(long, env = "ATO_CREDENTIAL_SECRET", hide_env_values = true)]
    pub password: String,

    /// ID of the execution instance used to run tests
    #[arg(long)]
    pub execution_instance_id: String,
}

#[derive(Debug, Subcommand)]
pub enum MappingsCommand {
    /// List all test mappings
    List,
    /// Add a test mapping
    Add {
        /// ID of the main component
        #[arg(long = "main-id", visible_alias = "mainId")]
        main_id: String,
        /// Name of the main component
        #[arg(long = "main-name")]
        main_name: Option<String>,
        /// ID of the test component
        #[arg(long = "test-id", visible_alias = "testId")]
        test_id: String,
        /// Name of the test component
        #[arg(long = "test-name")]
        test_name: Option<String>,
    },
    /// Bulk import mappings from a CSV file
    Import {
        /// CSV with `mainComponentId` and `testComponentId` columns
        #[arg(long = "from-csv", value_name = "PATH")]
        from_csv: PathBuf,
    },
    /// Remove a test mapping by ID
    Rm { mapping_id: String },
}

fn parse_plan_type(value: &str) -> Result<PlanType, String> {
    value.parse()
}
