//! Release command: wires arguments, credentials and the API client into
//! an orchestrator run.
use log::*;

use crate::{
    Result,
    cli::Args,
    forge::github::Github,
    orchestrator::{Orchestrator, RunConfig, RunOutcome},
};

/// Execute one release stage.
pub async fn execute(args: &Args) -> Result<RunOutcome> {
    let params = args.params()?;

    let config = RunConfig::builder()
        .params(params.clone())
        .repo_name(args.git_repo_name.clone())
        .git_revision(args.git_revision.clone())
        .build_version(args.build_version.clone())
        .build()?;

    debug!("run config: {config:#?}");

    let remote = args.remote_config(&params)?;
    let client = Github::new(remote)?;

    info!(
        "releasing {}/{} version {}",
        args.git_repo_owner, args.git_repo_name, config.version
    );

    Orchestrator::new(config, Box::new(client)).run().await
}
