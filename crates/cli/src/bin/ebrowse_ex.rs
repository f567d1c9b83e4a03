use devwrap_cli::cmd::browse::{self, BrowseArgs};
use devwrap_cli::{exit_code, logging};

fn main() {
  let args = BrowseArgs::parse_known();
  logging::init(args.verbose);
  std::process::exit(exit_code(browse::run(args)));
}
