use bytes::Bytes;
use futures::StreamExt;
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::session::ConnectionId;
use crate::Result;

/// One client socket. The id lives as long as the socket and keys the session in the engine.
pub struct Connection {
    pub id: ConnectionId,
    pub client_address: SocketAddr,
    reader: FramedRead<OwnedReadHalf, FrameCodec>,
    pub writer: OwnedWriteHalf,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr, max_frame_size: usize) -> Connection {
        let (reader, writer) = stream.into_split();

        Connection {
            id: Uuid::new_v4(),
            client_address,
            reader: FramedRead::new(reader, FrameCodec::new(max_frame_size)),
            writer,
        }
    }

    /// Reads the next request payload. `None` once the peer closed the connection.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>> {
        self.reader.next().await.transpose()
    }
}
