use super::Action;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Serve {
            config,
            listen,
            port,
        } => crate::probe::start(config, listen, port).await,
    }
}
