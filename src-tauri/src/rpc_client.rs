use std::{
    fmt,
    io::{BufRead, BufReader, Write},
    net::{TcpStream, ToSocketAddrs},
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RPC_LOOPBACK_HOST;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
    pub host: String,
    pub port: u16,
}

impl RpcEndpoint {
    pub fn loopback(port: u16) -> Self {
        Self {
            host: RPC_LOOPBACK_HOST.to_string(),
            port,
        }
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Could not connect, send, or read a reply in time.
    Transport(String),
    /// The backend answered with an error.
    Remote { name: String, message: String },
    /// The reply could not be understood.
    Protocol(String),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "RPC transport error: {reason}"),
            Self::Remote { name, message } => write!(f, "RPC remote error {name}: {message}"),
            Self::Protocol(reason) => write!(f, "RPC protocol error: {reason}"),
        }
    }
}

impl std::error::Error for RpcError {}

pub trait RpcClient {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, RpcError>;

    fn echo(&self, message: &str) -> Result<String, RpcError> {
        let reply = self.invoke("echo", &[Value::String(message.to_string())])?;
        match reply {
            Value::String(text) => Ok(text),
            other => Err(RpcError::Protocol(format!(
                "echo returned a non-string reply: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'a str,
    args: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct RpcRemoteError {
    name: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    id: u64,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcRemoteError>,
}

/// One JSON request line out, one JSON reply line back, one connection per
/// call.
#[derive(Debug)]
pub struct TcpJsonRpcClient {
    endpoint: RpcEndpoint,
    timeout: Duration,
    next_id: AtomicU64,
}

impl TcpJsonRpcClient {
    pub fn new(endpoint: RpcEndpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout: timeout.max(Duration::from_millis(50)),
            next_id: AtomicU64::new(1),
        }
    }

    fn connect(&self) -> Result<TcpStream, RpcError> {
        let addrs = (self.endpoint.host.as_str(), self.endpoint.port)
            .to_socket_addrs()
            .map_err(|error| {
                RpcError::Transport(format!("failed to resolve {}: {}", self.endpoint, error))
            })?
            .collect::<Vec<_>>();

        let mut last_error = None;
        for address in &addrs {
            match TcpStream::connect_timeout(address, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(error) => last_error = Some(error),
            }
        }

        Err(RpcError::Transport(match last_error {
            Some(error) => format!("failed to connect to {}: {}", self.endpoint, error),
            None => format!("no addresses resolved for {}", self.endpoint),
        }))
    }
}

impl RpcClient for TcpJsonRpcClient {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&RpcRequest { id, method, args })
            .map_err(|error| RpcError::Protocol(format!("failed to encode request: {error}")))?;
        line.push('\n');

        let mut stream = self.connect()?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.timeout)))
            .map_err(|error| RpcError::Transport(format!("failed to set socket timeout: {error}")))?;
        stream
            .write_all(line.as_bytes())
            .and_then(|()| stream.flush())
            .map_err(|error| RpcError::Transport(format!("failed to send '{method}': {error}")))?;

        let mut reply = String::new();
        let read = BufReader::new(&stream)
            .read_line(&mut reply)
            .map_err(|error| {
                RpcError::Transport(format!("failed to read reply to '{method}': {error}"))
            })?;
        if read == 0 {
            return Err(RpcError::Transport(format!(
                "connection closed before reply to '{method}'"
            )));
        }

        let response: RpcResponse = serde_json::from_str(reply.trim_end())
            .map_err(|error| RpcError::Protocol(format!("invalid reply to '{method}': {error}")))?;
        if response.id != id {
            return Err(RpcError::Protocol(format!(
                "reply id {} does not match request id {}",
                response.id, id
            )));
        }
        if let Some(error) = response.error {
            return Err(RpcError::Remote {
                name: error.name,
                message: error.message,
            });
        }
        Ok(response.result)
    }
}
