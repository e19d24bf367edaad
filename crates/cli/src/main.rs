use std::process::ExitCode;

fn main() -> ExitCode {
    shopsignal_cli::run()
}
