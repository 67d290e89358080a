//! Standalone fixture server for trying `http-call` configurations by hand.
//!
//! Listens on 127.0.0.1, port `PORT` (default 3000).

use tokio::net::TcpListener;

const ROUTES: &[&str] = &[
    "GET /json",
    "GET /html",
    "ANY /status/{code}",
    "ANY /echo",
    "GET /delay/{millis}",
    "GET /bytes/{len}",
    "GET /hits",
];

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(("127.0.0.1", port_number(&port)?)).await?;
    let addr = listener.local_addr()?;
    println!("fixture server listening on http://{addr}");
    for route in ROUTES {
        println!("  {route}");
    }
    mock_server::run(listener).await
}

fn port_number(raw: &str) -> Result<u16, std::io::Error> {
    raw.parse().map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("PORT must be a port number, got '{raw}'"),
        )
    })
}
