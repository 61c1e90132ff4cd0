use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use tlsdissect_core::{decode_handshake, HandshakeBody, HandshakeRecord};

const CONTENT_HANDSHAKE: u8 = 0x16;
const MAX_RECORD_LEN: usize = 16384;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let port: u16 = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8443);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let listener = TcpListener::bind(addr).await?;

    info!("tlsdissect listening on {}", addr);
    info!("Test with: curl -k https://localhost:{}", port);

    loop {
        let (mut stream, peer) = listener.accept().await?;

        tokio::spawn(async move {
            match read_first_record(&mut stream).await {
                Ok(Some(body)) => match decode_handshake(body.len(), &body) {
                    Ok(record) => print_summary(peer, &record),
                    Err(e) => error!("[{}] decode error: {} ({:?})", peer, e, e.kind()),
                },
                Ok(None) => {}
                Err(e) => warn!("[{}] {:#}", peer, e),
            }
        });
    }
}

/// Read the first TLS record and return its body, or `None` when the peer
/// did not open with a handshake record. A ClientHello normally fills the
/// first record on its own.
async fn read_first_record(stream: &mut TcpStream) -> anyhow::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 5];
    stream
        .read_exact(&mut header)
        .await
        .context("reading record header")?;

    if header[0] != CONTENT_HANDSHAKE {
        debug!("first record has content type 0x{:02x}, ignoring", header[0]);
        return Ok(None);
    }

    let record_len = u16::from_be_bytes([header[3], header[4]]) as usize;
    if record_len > MAX_RECORD_LEN {
        anyhow::bail!("record too large: {} bytes", record_len);
    }

    let mut body = vec![0u8; record_len];
    stream
        .read_exact(&mut body)
        .await
        .context("reading record body")?;
    Ok(Some(body))
}

fn print_summary(peer: SocketAddr, record: &HandshakeRecord) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Client:     {}", peer);
    println!("  Message:    {}", record.handshake_type);
    match &record.body {
        HandshakeBody::ClientHello(ch) => {
            println!(
                "  SNI:        {}",
                ch.info.hello.server_name.as_deref().unwrap_or("(none)")
            );
            println!("  TLS ver:    {} (0x{:04x})", ch.version, ch.version.0);
            println!("  Ciphers:    {} suites", ch.cipher_suites.len());
            println!("  Extensions: {} types", ch.extensions.len());
            if !ch.info.hello.protocols.is_empty() {
                println!("  ALPN:       {}", ch.info.hello.protocols.join(", "));
            }
            println!("  ──────────────────────────────────────────────────");
            println!("  JA3:        {}", ch.info.ja3_fingerprint);
            println!("  JA3 raw:    {}", ch.info.ja3_string);
        }
        _ => println!("  Length:     {} bytes", record.length),
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
