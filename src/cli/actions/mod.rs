pub mod server;

#[derive(Debug)]
pub enum Action {
    Server { port: u16, session_ttl: u64 },
}
