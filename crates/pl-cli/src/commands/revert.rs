//! Revert command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, RevertArgs};
use crate::commands::common::{self, load_project, open_target};

/// Execute the revert command
pub(crate) fn execute(args: &RevertArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migration = project.migration(args.target_version)?;
    let target = open_target(&project, global)?;

    let runner = common::build_runner(&project, &target, args.yes, "Revert");
    if global.verbose {
        eprintln!("[verbose] Revert policy: {}", runner.revert_policy());
    }

    println!("Reverting version {}...\n", args.target_version);
    let outcome = runner.revert(migration);
    common::print_outcome(&outcome, global.verbose);
    common::finish(std::slice::from_ref(&outcome))
}
