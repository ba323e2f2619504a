use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands::Command;
use crate::connection::{Connection, ConnectionError};
use crate::frame::Frame;
use crate::pool::BufferPool;
use crate::store::Store;
use crate::Error;

pub async fn run(port: u16) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let store = Store::new();
    let pool = BufferPool::new();

    info!("Redis server listening on {}", listener.local_addr()?);

    loop {
        // An accept failure affects no established connection, so log it
        // and keep accepting.
        let (socket, client_address) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let store = store.clone();
        let pool = pool.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, pool).await {
                error!("Connection error: {}", e);
            }
        });
    }
}

/// Runs one connection's {read frame, dispatch, write reply} loop until the
/// client goes away. Requests are answered strictly in arrival order; each
/// reply is fully written before the next frame is read, so pipelined
/// requests on one connection never interleave.
#[instrument(
    name = "connection",
    skip(stream, store, pool),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    pool: BufferPool,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, pool);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let frame = match conn.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            // A malformed frame is the client's problem, not grounds for
            // dropping it: report and read on.
            Err(ConnectionError::Protocol(err)) => {
                info!("Client sent a malformed frame: {}", err);
                conn.write_frame(&Frame::Error(format!("ERR {}", err))).await?;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        debug!("Received frame from client: {:?}", frame);
        let reply = Command::dispatch(frame, &store).await;
        debug!("Sending response to client: {:?}", reply);

        conn.write_frame(&reply).await?;
    }

    info!("Connection closed");
    Ok(())
}
