//! In-process RESP2 server for exercising the Redis client path
//!
//! Speaks just enough of the protocol for the facade: connection setup
//! (`CLIENT`, `PING`), `GET`, `SET`, `HSET`, `HGETALL` and `QUIT`. Data lives
//! in a [`MemoryStore`] the test can inspect. Dropping the server closes
//! every client connection it accepted.

#![allow(dead_code)]

use nom::{
    bytes::streaming::{tag, take, take_until},
    combinator::map_res,
    multi::count,
    sequence::{preceded, terminated},
    IResult,
};
use redis_facade::{MemoryStore, StoreError};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::broadcast,
    task::JoinHandle,
};

/// Replies sent back to the client
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Simple(&'static str),
    Bulk(Option<String>),
    Integer(i64),
    Array(Vec<String>),
    Error(String),
}

impl Reply {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Reply::Simple(s) => format!("+{}\r\n", s).into_bytes(),
            Reply::Bulk(None) => b"$-1\r\n".to_vec(),
            Reply::Bulk(Some(data)) => bulk_bytes(data),
            Reply::Integer(n) => format!(":{}\r\n", n).into_bytes(),
            Reply::Array(items) => {
                let mut out = format!("*{}\r\n", items.len()).into_bytes();
                for item in items {
                    out.extend(bulk_bytes(item));
                }
                out
            }
            Reply::Error(e) => format!("-{}\r\n", e).into_bytes(),
        }
    }
}

fn bulk_bytes(data: &str) -> Vec<u8> {
    format!("${}\r\n{}\r\n", data.len(), data).into_bytes()
}

fn line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_until("\r\n"), tag("\r\n"))(input)
}

fn decimal(digits: &[u8]) -> Result<usize, std::num::ParseIntError> {
    String::from_utf8_lossy(digits).parse()
}

fn length(input: &[u8]) -> IResult<&[u8], usize> {
    map_res(line, decimal)(input)
}

fn bulk(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (input, len) = preceded(tag("$"), length)(input)?;
    let (input, data) = terminated(take(len), tag("\r\n"))(input)?;
    Ok((input, data.to_vec()))
}

/// Parse one `*<argc>` array of bulk strings; `Incomplete` until all bytes arrived
pub fn parse_command(input: &[u8]) -> IResult<&[u8], Vec<Vec<u8>>> {
    let (input, argc) = preceded(tag("*"), length)(input)?;
    count(bulk, argc)(input)
}

fn wrong_type() -> Reply {
    Reply::Error("WRONGTYPE Operation against a key holding the wrong kind of value".to_string())
}

fn arity(name: &str) -> Reply {
    Reply::Error(format!(
        "ERR wrong number of arguments for '{}' command",
        name.to_lowercase()
    ))
}

/// Execute one command against the store
pub async fn execute(args: &[String], store: &MemoryStore) -> Reply {
    let Some(name) = args.first() else {
        return Reply::Error("ERR empty command".to_string());
    };

    match name.to_uppercase().as_str() {
        "CLIENT" | "QUIT" => Reply::Simple("OK"),
        "PING" => Reply::Simple("PONG"),
        "GET" => {
            if args.len() != 2 {
                return arity(name);
            }
            match store.get(&args[1]).await {
                Ok(value) => Reply::Bulk(value),
                Err(StoreError::WrongType(_)) => wrong_type(),
                Err(e) => Reply::Error(format!("ERR {}", e)),
            }
        }
        "SET" => {
            if args.len() != 3 {
                return arity(name);
            }
            match store.set(args[1].clone(), args[2].clone()).await {
                Ok(()) => Reply::Simple("OK"),
                Err(e) => Reply::Error(format!("ERR {}", e)),
            }
        }
        "HSET" => {
            if args.len() < 4 || args.len() % 2 != 0 {
                return arity(name);
            }
            let fields = args[2..]
                .chunks(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()));
            match store.hset(&args[1], fields).await {
                Ok(added) => Reply::Integer(added as i64),
                Err(StoreError::WrongType(_)) => wrong_type(),
                Err(e) => Reply::Error(format!("ERR {}", e)),
            }
        }
        "HGETALL" => {
            if args.len() != 2 {
                return arity(name);
            }
            match store.hgetall(&args[1]).await {
                Ok(hash) => Reply::Array(hash.into_iter().flat_map(|(f, v)| [f, v]).collect()),
                Err(StoreError::WrongType(_)) => wrong_type(),
                Err(e) => Reply::Error(format!("ERR {}", e)),
            }
        }
        _ => Reply::Error(format!("ERR unknown command '{}'", name)),
    }
}

/// Stub server bound to an ephemeral local port; stops when dropped
pub struct StubServer {
    pub url: String,
    pub store: MemoryStore,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Self {
        Self::with_store(MemoryStore::new()).await
    }

    pub async fn with_store(store: MemoryStore) -> Self {
        Self::spawn(store, None).await
    }

    /// Server that closes the client socket instead of answering `command`
    pub async fn dropping_on(command: &str) -> Self {
        Self::spawn(MemoryStore::new(), Some(command.to_uppercase())).await
    }

    async fn spawn(store: MemoryStore, drop_on: Option<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, _) = broadcast::channel(1);

        let accept_store = store.clone();
        let accept_tx = shutdown_tx.clone();
        let task = tokio::spawn(async move {
            let mut shutdown_rx = accept_tx.subscribe();
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else {
                            break;
                        };
                        let client = Client {
                            store: accept_store.clone(),
                            drop_on: drop_on.clone(),
                        };
                        let shutdown_rx = accept_tx.subscribe();
                        tokio::spawn(async move {
                            let _ = client.serve(stream, shutdown_rx).await;
                        });
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        Self {
            url: format!("redis://{}/", addr),
            store,
            shutdown_tx,
            task,
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        // Client tasks hold a receiver each; the accept loop too
        let _ = self.shutdown_tx.send(());
        self.task.abort();
    }
}

struct Client {
    store: MemoryStore,
    drop_on: Option<String>,
}

impl Client {
    async fn serve(
        &self,
        mut stream: TcpStream,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        let mut buffer = Vec::with_capacity(4096);
        let mut chunk = [0u8; 4096];

        loop {
            let n = tokio::select! {
                result = stream.read(&mut chunk) => result?,
                _ = shutdown_rx.recv() => return Ok(()),
            };
            if n == 0 {
                return Ok(());
            }
            buffer.extend_from_slice(&chunk[..n]);

            // Clients pipeline, so one read may hold several commands
            loop {
                let (consumed, raw) = match parse_command(&buffer) {
                    Ok((rest, raw)) => (buffer.len() - rest.len(), raw),
                    Err(nom::Err::Incomplete(_)) => break,
                    Err(_) => {
                        stream.write_all(b"-ERR protocol error\r\n").await?;
                        return Ok(());
                    }
                };
                buffer.drain(..consumed);

                let args: Vec<String> = raw
                    .iter()
                    .map(|arg| String::from_utf8_lossy(arg).into_owned())
                    .collect();
                let name = args.first().map(|name| name.to_uppercase());

                if name.is_some() && name == self.drop_on {
                    return Ok(());
                }

                let reply = execute(&args, &self.store).await;
                stream.write_all(&reply.to_bytes()).await?;
                stream.flush().await?;

                if name.as_deref() == Some("QUIT") {
                    return Ok(());
                }
            }
        }
    }
}

/// URL of a local port with nothing listening on it
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("redis://{}/", addr)
}
