use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::connection::Connection;
use crate::engine::{Engine, Request};
use crate::Result;

pub async fn run(config: Config) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(config.address()).await?;

    info!("Server listening on {}", listener.local_addr()?);

    // Every command runs on this single task, in the order requests arrive.
    let (requests, receiver) = mpsc::unbounded_channel();
    tokio::spawn(Engine::new().run(receiver));

    let max_frame_size = config.max_frame_size;

    loop {
        let (socket, client_address) = listener.accept().await?;
        let requests = requests.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, client_address, requests, max_frame_size).await
            {
                error!("Connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, requests, max_frame_size),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    requests: mpsc::UnboundedSender<Request>,
    max_frame_size: usize,
) -> Result<()> {
    let mut conn = Connection::new(stream, client_address, max_frame_size);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    let res = serve(&mut conn, &requests).await;

    // The engine drops the session on an empty payload, whatever ended the connection.
    let (reply, _) = oneshot::channel();
    let _ = requests.send(Request {
        connection_id: conn.id,
        payload: Default::default(),
        reply,
    });

    info!("Connection closed");
    res
}

async fn serve(
    conn: &mut Connection,
    requests: &mpsc::UnboundedSender<Request>,
) -> Result<()> {
    while let Some(payload) = conn.read_frame().await? {
        debug!("Received {} bytes from client", payload.len());

        let (reply, response) = oneshot::channel();
        requests
            .send(Request {
                connection_id: conn.id,
                payload,
                reply,
            })
            .map_err(|_| "engine is not running")?;

        // Nothing is written back for malformed requests.
        if let Some(res) = response.await? {
            conn.writer.write_all(&res).await?;
        }
    }

    Ok(())
}
