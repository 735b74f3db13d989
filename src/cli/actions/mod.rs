pub mod server;

/// Actions the CLI can dispatch to.
#[derive(Debug, Clone)]
pub enum Action {
    Server { port: u16, dsn: String },
}
