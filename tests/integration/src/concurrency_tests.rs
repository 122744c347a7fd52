//! Concurrency Tests - many simultaneous pings
//!
//! The codec is stateless and each client owns its socket, so concurrent
//! pings must never see each other's responses.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use cldap::{decode_response, encode_ping, CldapClient, CldapClientBuilder, CldapError};
use common::*;
use futures::future::join_all;
use tokio::sync::Barrier;

/// Test: many clients ping one server at the same moment
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_clients() {
    init_logging();

    const NUM_CLIENTS: usize = 50;

    let (addr, server_stats, server) = start_fake_dc(Reply::EchoDomain).await.unwrap();
    let stats = Arc::new(ConcurrentStats::new());
    let barrier = Arc::new(Barrier::new(NUM_CLIENTS));

    let mut handles = Vec::new();
    for client_id in 0..NUM_CLIENTS {
        let stats = stats.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier.wait().await;

            let domain = format!("d{}.example.com", client_id);
            let mut client = match CldapClientBuilder::new(addr)
                .timeout(Duration::from_secs(5))
                .build()
                .await
            {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Client {} failed to bind: {}", client_id, e);
                    stats.record_failure();
                    return;
                }
            };

            let start = Instant::now();
            match client.ping(Some(&domain)).await {
                Ok(response) if response.dns_domain_name() == domain => {
                    stats.record_success(start.elapsed())
                }
                Ok(response) => {
                    eprintln!(
                        "Client {} got response for {}",
                        client_id,
                        response.dns_domain_name()
                    );
                    stats.record_failure();
                }
                Err(CldapError::Timeout(_)) => stats.record_timeout(),
                Err(e) => {
                    eprintln!("Client {} ping failed: {}", client_id, e);
                    stats.record_failure();
                }
            }
        }));
    }

    join_all(handles).await;
    server.abort();

    stats.print_report("Concurrent Clients");
    assert_eq!(stats.success_count(), NUM_CLIENTS as u64);
    assert_eq!(stats.failure_count(), 0);
    assert_eq!(server_stats.requests(), NUM_CLIENTS as u64);
}

/// Test: one client issues pings back to back
#[tokio::test]
async fn test_sequential_pings_single_client() {
    init_logging();

    const NUM_PINGS: usize = 100;

    let (addr, server_stats, server) = start_fake_dc(Reply::EchoDomain).await.unwrap();
    let mut client = CldapClient::connect(addr).await.unwrap();

    for i in 0..NUM_PINGS {
        let domain = format!("seq{}.example.com", i);
        let response = client.ping(Some(&domain)).await.unwrap();
        assert_eq!(response.dns_host_name(), format!("dc1.{}", domain));
    }
    assert_eq!(server_stats.requests(), NUM_PINGS as u64);

    server.abort();
}

/// Test: concurrent pings to servers that answer differently stay isolated
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_outcomes_are_isolated() {
    init_logging();

    let (good_addr, _, good) = start_fake_dc(Reply::EchoDomain).await.unwrap();
    let (silent_addr, _, silent) = start_fake_dc(Reply::Silent).await.unwrap();

    let pings = (0..20).map(|i| async move {
        let addr = if i % 2 == 0 { good_addr } else { silent_addr };
        let built = CldapClientBuilder::new(addr)
            .timeout(Duration::from_millis(300))
            .build()
            .await;
        match built {
            Ok(mut client) => client.ping(Some("mixed.example.com")).await,
            Err(e) => Err(e),
        }
    });
    let results = join_all(pings).await;

    for (i, result) in results.iter().enumerate() {
        if i % 2 == 0 {
            let response = result.as_ref().unwrap();
            assert_eq!(response.dns_domain_name(), "mixed.example.com");
        } else {
            assert!(matches!(result, Err(CldapError::Timeout(_))));
        }
    }

    good.abort();
    silent.abort();
}

/// Test: the synchronous codec is safe to call from many threads at once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_codec_from_blocking_threads() {
    init_logging();

    let reference = encode_ping(Some("corp.example.com"));
    let datagram = cldap::cldap::encode_search_result_entry(1, CAPTURED_RESPONSE);

    let tasks = (0..32).map(|_| {
        let reference = reference.clone();
        let datagram = datagram.clone();
        tokio::task::spawn_blocking(move || {
            for _ in 0..100 {
                assert_eq!(encode_ping(Some("corp.example.com")), reference);
                let response = decode_response(&datagram).unwrap();
                assert_eq!(response.domain_guid().to_string(), TEST_GUID_STR);
            }
        })
    });

    for result in join_all(tasks).await {
        result.unwrap();
    }
}
