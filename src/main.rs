//! twig binary entry point.

fn main() -> std::process::ExitCode {
    twig::cli::run()
}
