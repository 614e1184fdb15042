//! End-to-end scenarios, grounded on `examples/original_source/` test
//! walkthroughs (two nodes in range reconstructing each other's EphID,
//! diagnosis propagation via `POSITIVE`, share-drop resilience) and on the
//! teacher's `oprf-test` suite's "spawn real services, drive them through
//! their externally observable behavior" style.

use std::time::Duration;

use dimy_core::BloomFilter;
use dimy_node::NodeState;
use dimy_types::constants::{K, N};
use dimy_types::UploadKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Uploads `filter` to the backend at `port` tagged `kind` and returns its
/// reply, using a raw TCP client rather than a full node so these tests
/// exercise the backend's framing and matching logic directly.
async fn upload(port: u16, kind: UploadKind, filter: &BloomFilter) -> String {
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
        .await
        .expect("connect to backend");
    stream.write_all(kind.as_tag()).await.expect("write tag");
    stream
        .write_all(&filter.to_bytes())
        .await
        .expect("write filter");
    stream.shutdown().await.expect("shutdown write half");
    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.expect("read reply");
    reply
}

#[tokio::test(flavor = "multi_thread")]
async fn backend_detects_contact_for_overlapping_filters() {
    let backend = dimy_test::start_backend();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let shared_key = b"a shared encounter id";
    let mut cbf = BloomFilter::new();
    cbf.add(shared_key);
    let cbf_reply = upload(backend.port, UploadKind::Cbf, &cbf).await;
    assert_eq!(cbf_reply, "Server: Contact Bloom Filter received.");

    let mut qbf = BloomFilter::new();
    qbf.add(shared_key);
    let qbf_reply = upload(backend.port, UploadKind::Qbf, &qbf).await;
    assert_eq!(
        qbf_reply,
        "Server: You have been in contact with a positive case."
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn backend_reports_no_contact_for_disjoint_filters() {
    let backend = dimy_test::start_backend();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut cbf = BloomFilter::new();
    cbf.add(b"a positive case's encounter id");
    let cbf_reply = upload(backend.port, UploadKind::Cbf, &cbf).await;
    assert_eq!(cbf_reply, "Server: Contact Bloom Filter received.");

    let mut qbf = BloomFilter::new();
    qbf.add(b"an entirely unrelated encounter id");
    let qbf_reply = upload(backend.port, UploadKind::Qbf, &qbf).await;
    assert_eq!(
        qbf_reply,
        "Server: No contact with a positive case was detected."
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn node_stops_cleanly_on_stop_command() {
    let backend = dimy_test::start_backend();
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dimy_test::write_script(dir.path(), "stop.txt", "MOVE 51000\nSTOP\n");
    let config = dimy_test::node_config(&backend, script, 0.0, 200.0);

    let handle = dimy_test::spawn_node(config);
    let result = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("node finished within timeout")
        .expect("node task didn't panic");
    assert!(result.is_ok(), "STOP should unwind the node cleanly: {result:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn node_rejects_command_script_not_starting_with_move() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dimy_test::write_script(dir.path(), "bad.txt", "WAIT 5\nSTOP\n");
    let backend = dimy_test::start_backend();
    let config = dimy_test::node_config(&backend, script, 0.0, 1.0);

    let err = NodeState::new(config).expect_err("first command must be MOVE");
    let message = err.to_string();
    assert!(message.contains("malformed command file"));
}

#[tokio::test(flavor = "multi_thread")]
async fn lossy_broadcasts_still_reconstruct_whenever_enough_shares_survive() {
    // Mirrors spec.md's SHARE_DROP=0.6 resilience scenario at the crypto
    // layer directly: with N=5 shares and a threshold of K=3, any subset of
    // at least K surviving shares must still reconstruct the secret, which
    // is what makes a 60% per-share drop rate tolerable in practice (the
    // binomial chance of fewer than K=3 of N=5 shares surviving a 60% drop
    // is the actual risk, not anything the Shamir scheme itself introduces).
    let mut rng = rand::thread_rng();
    let secret = *b"0123456789abcdef0123456789abcdef";
    let shares = dimy_core::shamir::split(&secret, K, N, &mut rng).expect("split");
    let indexed: Vec<(u8, &[u8])> = shares
        .iter()
        .enumerate()
        .map(|(i, share)| ((i + 1) as u8, share.as_slice()))
        .collect();

    for surviving in K as usize..=N as usize {
        let subset = &indexed[..surviving];
        let recovered = dimy_core::shamir::combine(subset).expect("combine");
        assert_eq!(recovered, secret);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn two_nodes_at_the_same_location_reconstruct_and_the_backend_sees_the_contact() {
    // Grounded on spec.md's two-nodes-in-range scenario: two nodes MOVE to
    // the same port, broadcast shares of their own EphIDs to each other,
    // reconstruct the peer's EphID from >= K shares, and fold the resulting
    // shared EncID into their own DBF. Once one of them is flagged
    // POSITIVE, its combined filter necessarily carries that shared EncID,
    // and the other node's own QBF query should come back positive.
    //
    // This assumes the test sandbox allows UDP broadcast delivery over
    // loopback; environments that disable broadcast on `lo` will instead
    // see the STOP-based assertions below pass while this one times out
    // waiting for a contact that never arrives over the wire.
    let backend = dimy_test::start_backend();
    let dir = tempfile::tempdir().expect("tempdir");
    let location = dimy_test::free_port();

    // WAIT 15 covers one full EPHID_TIME window (five SHARE_TIME ticks at
    // 3/6/9/12/15s), comfortably past the K=3 shares the bystander needs to
    // reconstruct the positive node's EphID before POSITIVE fires.
    let positive_script = dimy_test::write_script(
        dir.path(),
        "positive.txt",
        &format!("MOVE {location}\nWAIT 15\nPOSITIVE 600\nWAIT 15\nSTOP\n"),
    );
    let bystander_script = dimy_test::write_script(
        dir.path(),
        "bystander.txt",
        &format!("MOVE {location}\nWAIT 30\nSTOP\n"),
    );

    // A time_scale compresses the protocol's 3s/15s/90s/540s intervals so
    // the scenario finishes in under a real second.
    let time_scale = 50.0;
    let positive_config =
        dimy_test::node_config(&backend, positive_script, 0.0, time_scale);
    let bystander_config =
        dimy_test::node_config(&backend, bystander_script, 0.0, time_scale);

    // Construct both nodes directly (rather than via `spawn_node`, which
    // would move them into separate tasks) so their state is still
    // inspectable once both scripts have run to completion.
    let mut positive_node = NodeState::new(positive_config).expect("valid positive config");
    let mut bystander_node = NodeState::new(bystander_config).expect("valid bystander config");

    let (positive_result, bystander_result) = tokio::time::timeout(
        Duration::from_secs(10),
        async { tokio::join!(positive_node.run(), bystander_node.run()) },
    )
    .await
    .expect("both nodes finish within timeout");
    positive_result.expect("positive node stops cleanly");
    bystander_result.expect("bystander node stops cleanly");

    // The bystander reconstructed the positive node's EphID over the wire
    // and folded the shared EncID into its own DBF; querying with that same
    // filter must come back positive now that the peer has been diagnosed.
    let probe = bystander_node.combined_filter();
    let probe_reply = upload(backend.port, UploadKind::Qbf, &probe).await;
    assert_eq!(
        probe_reply,
        "Server: You have been in contact with a positive case."
    );
}
