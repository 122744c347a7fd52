//! Shared helpers for the integration tests: a fake domain controller that
//! answers CLDAP pings over loopback UDP, payload builders and statistics.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use bytes::Bytes;
use cldap::ber::{BerReader, BerWriter};
use cldap::cldap::{encode_search_result_entry, TAG_FILTER_AND, TAG_SEARCH_REQUEST};
use cldap::rfc1035::encode_names;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-friendly subscriber once per process (honours RUST_LOG)
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const TEST_GUID: [u8; 16] = [
    0xe1, 0xa3, 0xa3, 0xd3, 0xf1, 0x6e, 0x7a, 0x4f, 0x9c, 0x1b, 0x2a, 0x5a, 0x0f, 0x6b, 0x9e, 0x11,
];
pub const TEST_GUID_STR: &str = "d3a3a3e1-6ef1-4f7a-9c1b-2a5a0f6b9e11";

/// PDC GC LDAP DS KDC TIMESERV CLOSEST WRITABLE FULL_SECRET WS DS_8 DS_9
pub const TEST_FLAGS: u32 = 0x0000_f1fd;

/// Domain answered when the ping carries an empty Host
pub const DEFAULT_DOMAIN: &str = "corp.example.com";

/// LOGON_SAM_LOGON_RESPONSE_EX with compression pointers, as a Windows DC sends it
pub const CAPTURED_RESPONSE: &[u8] = b"\
    \x17\x00\x00\x00\xfd\xf3\x00\x00\
    \xe1\xa3\xa3\xd3\xf1\x6e\x7a\x4f\x9c\x1b\x2a\x5a\x0f\x6b\x9e\x11\
    \x04corp\x07example\x03com\x00\
    \xc0\x18\
    \x03dc1\xc0\x18\
    \x04CORP\x00\
    \x03DC1\x00\
    \x00\
    \x17Default-First-Site-Name\x00\
    \xc0\x3e\
    \x05\x00\x00\x00\xff\xff\xff\xff";

/// Good footer: NtVersion 5 | 5EX, both tokens 0xFFFF
pub const FOOTER: [u8; 8] = [0x05, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];

/// Build an uncompressed NETLOGON payload from explicit names
pub fn netlogon_payload(flags: u32, names: &[&str], footer: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(&23u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&flags.to_le_bytes());
    data.extend_from_slice(&TEST_GUID);
    data.extend_from_slice(&encode_names(names));
    data.extend_from_slice(footer);
    data
}

/// Payload describing `dc1.<domain>` in the default site
pub fn payload_for_domain(domain: &str) -> Vec<u8> {
    let host = format!("dc1.{}", domain);
    let netbios = domain
        .split('.')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    netlogon_payload(
        TEST_FLAGS,
        &[
            domain,
            domain,
            &host,
            &netbios,
            "DC1",
            "",
            "Default-First-Site-Name",
            "Default-First-Site-Name",
        ],
        &FOOTER,
    )
}

/// Host assertion value carried by a CLDAP ping request
pub fn requested_host(request: &[u8]) -> Option<String> {
    let mut reader = BerReader::new(request);
    let (_, mut message) = reader.enter().ok()?;
    message.skip().ok()?;
    let (tag, mut search) = message.enter().ok()?;
    if tag != TAG_SEARCH_REQUEST {
        return None;
    }
    for _ in 0..6 {
        search.skip().ok()?;
    }
    let (tag, mut filter) = search.enter().ok()?;
    if tag != TAG_FILTER_AND {
        return None;
    }
    let (_, mut host) = filter.enter().ok()?;
    if host.read_octet_string().ok()? != b"Host" {
        return None;
    }
    let value = host.read_octet_string().ok()?;
    Some(String::from_utf8_lossy(value).into_owned())
}

/// How the fake domain controller answers
#[derive(Debug, Clone)]
pub enum Reply {
    /// Describe the requested domain (or DEFAULT_DOMAIN for an empty Host)
    EchoDomain,
    /// Wrap this NETLOGON payload in a SearchResultEntry
    Netlogon(Bytes),
    /// Send this datagram as is
    Raw(Bytes),
    /// Never answer
    Silent,
}

/// Loopback UDP server answering CLDAP pings
pub struct FakeDomainController {
    socket: UdpSocket,
    reply: Reply,
    stats: Arc<ServerStats>,
}

#[derive(Debug, Default)]
pub struct ServerStats {
    requests: AtomicU64,
    malformed: AtomicU64,
}

impl ServerStats {
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }
}

impl FakeDomainController {
    pub async fn bind(reply: Reply) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        Ok(Self {
            socket,
            reply,
            stats: Arc::new(ServerStats::default()),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        self.stats.clone()
    }

    fn answer(&self, request: &[u8]) -> Option<Bytes> {
        match &self.reply {
            Reply::EchoDomain => {
                let host = requested_host(request)?;
                let domain = if host.is_empty() { DEFAULT_DOMAIN } else { host.as_str() };
                Some(encode_search_result_entry(1, &payload_for_domain(domain)))
            }
            Reply::Netlogon(payload) => Some(encode_search_result_entry(1, payload)),
            Reply::Raw(datagram) => Some(datagram.clone()),
            Reply::Silent => None,
        }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let mut buf = vec![0u8; 2048];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            self.stats.requests.fetch_add(1, Ordering::Relaxed);
            let request = &buf[..len];
            if requested_host(request).is_none() {
                warn!("fake DC received malformed ping from {}", from);
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
            }
            if let Some(reply) = self.answer(request) {
                debug!("fake DC answering {} with {} bytes", from, reply.len());
                self.socket.send_to(&reply, from).await?;
            }
        }
    }
}

/// Start a fake domain controller on an ephemeral port
pub async fn start_fake_dc(
    reply: Reply,
) -> std::io::Result<(SocketAddr, Arc<ServerStats>, JoinHandle<std::io::Result<()>>)> {
    let server = FakeDomainController::bind(reply).await?;
    let addr = server.local_addr()?;
    let stats = server.stats();
    let handle = tokio::spawn(server.run());
    Ok((addr, stats, handle))
}

/// SearchResultEntry followed by SearchResultDone in one datagram
pub fn entry_and_done(payload: &[u8]) -> Bytes {
    let mut w = BerWriter::new();
    w.write_sequence(|message| {
        message.write_integer(1);
        message.write_constructed(0x65, |done| {
            done.write_enumerated(0).write_octet_string(b"").write_octet_string(b"");
        });
    });
    let mut datagram = encode_search_result_entry(1, payload).to_vec();
    datagram.extend_from_slice(&w.freeze());
    Bytes::from(datagram)
}

/// Outcome counters shared between concurrent clients
#[derive(Debug, Default)]
pub struct ConcurrentStats {
    success: AtomicU64,
    failure: AtomicU64,
    timeouts: AtomicU64,
    total_latency_us: AtomicU64,
    max_latency_us: AtomicU64,
}

impl ConcurrentStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, latency: Duration) {
        let us = latency.as_micros() as u64;
        self.success.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(us, Ordering::Relaxed);
        self.max_latency_us.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        self.record_failure();
    }

    pub fn success_count(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    pub fn timeout_count(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn avg_latency(&self) -> Duration {
        let count = self.success_count();
        if count == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.total_latency_us.load(Ordering::Relaxed) / count)
    }

    pub fn max_latency(&self) -> Duration {
        Duration::from_micros(self.max_latency_us.load(Ordering::Relaxed))
    }

    pub fn print_report(&self, title: &str) {
        println!("\n=== {} ===", title);
        println!("Successful: {}", self.success_count());
        println!("Failed: {} (timeouts: {})", self.failure_count(), self.timeout_count());
        println!("Avg latency: {:?}", self.avg_latency());
        println!("Max latency: {:?}", self.max_latency());
    }
}

/// Per-category results collected by the harness binary
#[derive(Debug, Default)]
pub struct TestSuiteResults {
    entries: Vec<(&'static str, bool, Duration, String)>,
}

impl TestSuiteResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, success: bool, duration: Duration, summary: String) {
        self.entries.push((name, success, duration, summary));
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|(_, ok, _, _)| *ok).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.passed()
    }

    pub fn print_summary(&self, total: Duration) {
        println!("\n{}", "=".repeat(72));
        println!("FINAL SUMMARY");
        println!("{}", "=".repeat(72));
        println!(
            "\nCategories: {} | Passed: {} | Failed: {}",
            self.entries.len(),
            self.passed(),
            self.failed()
        );
        println!("Total Duration: {:?}\n", total);
        println!("{:<24} {:<8} {:<15} {}", "Category", "Status", "Duration", "Details");
        println!("{}", "-".repeat(72));
        for (name, ok, duration, summary) in &self.entries {
            let status = if *ok { "PASS" } else { "FAIL" };
            println!("{:<24} {:<8} {:<15?} {}", name, status, duration, summary);
        }
    }
}
