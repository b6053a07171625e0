pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        session_ttl_days: i64,
        store_timeout_seconds: u64,
    },
}
