use clap::Parser;

use devwrap_cli::cmd::qtproj::{self, QtprojArgs};
use devwrap_cli::{exit_code, logging};

fn main() {
  let args = QtprojArgs::parse();
  logging::init(args.verbose);
  std::process::exit(exit_code(qtproj::run(args)));
}
