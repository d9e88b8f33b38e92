// crudforge CLI entry point

use crudforge_cli::{output, router::CommandRouter, VerbosityLevel};

#[tokio::main]
async fn main() {
    let result = CommandRouter::route().await;

    if let Err(e) = result {
        output::print_error(&e.user_message());
        if VerbosityLevel::VeryVerbose.should_output() {
            eprintln!("{}", e.technical_details());
        }
        std::process::exit(1);
    }
}
