use anyhow::Result;
use custos::cli::{actions, actions::Action, start, telemetry};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Server { .. } => actions::server::handle(action, &globals).await?,
    }

    // Flush any pending trace spans before exit
    telemetry::shutdown_tracer();

    Ok(())
}
