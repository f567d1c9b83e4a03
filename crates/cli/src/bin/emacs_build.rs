use clap::Parser;

use devwrap_cli::cmd::repo_build::{self, RepoBuildArgs};
use devwrap_cli::{exit_code, logging};

fn main() {
  let args = RepoBuildArgs::parse();
  logging::init(args.verbose);
  std::process::exit(exit_code(repo_build::run(args)));
}
