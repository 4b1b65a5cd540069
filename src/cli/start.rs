use super::{commands, dispatch, telemetry};
use anyhow::Result;
use tracing::debug;

/// Main orchestrator - Pure orchestration with no business logic
///
/// Five-step data flow:
/// 1. Parse: Extract CLI arguments, `.env` is loaded first so clap sees it
/// 2. Extract Verbosity: Convert flag count to logging level
/// 3. Initialize Telemetry: Set up structured logging/tracing
/// 4. Dispatch: Convert `ArgMatches` into typed Action enum
/// 5. Execute: Run the action's business logic
///
/// # Errors
///
/// Returns an error if any step in the flow fails
pub async fn start() -> Result<()> {
    // Variables already set in the environment win over .env
    let env_file = dotenv::dotenv().ok();

    // 1. Parse: Extract CLI arguments, exits on missing DB_* settings
    let matches = commands::new().get_matches();

    // 2. Extract Verbosity
    let verbosity = matches.get_count("verbose");

    // 3. Initialize Telemetry
    telemetry::init(verbosity, matches.get_flag("log-json"))?;

    if let Some(path) = env_file {
        debug!(path = %path.display(), "loaded environment file");
    }

    // 4. Dispatch: Convert ArgMatches into typed Action enum
    let action = dispatch::dispatch(&matches)?;

    // 5. Execute: Run the action's business logic
    action.execute().await?;

    Ok(())
}
