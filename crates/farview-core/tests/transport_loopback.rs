//! TCP loopback test for the tokio driver.
#![cfg(feature = "transport")]

use farview_core::transport::{ChannelEvent, accept, connect};
use farview_core::Encryptor;
use farview_crypto::{EncryptionMethod, GROUP_4096, MemoryVerifierStore, VerifierEntry};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::net::TcpListener;

#[tokio::test(flavor = "multi_thread")]
async fn tcp_loopback_carries_a_message() {
    let mut rng = StdRng::seed_from_u64(9);

    let mut store = MemoryVerifierStore::new();
    store.insert("alice", VerifierEntry::generate(&GROUP_4096, "alice", "s3cret!", &mut rng));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let responder =
            Encryptor::responder(EncryptionMethod::SrpChaCha20Poly1305, Box::new(store));
        let mut handle = accept(socket, responder).unwrap();

        assert_eq!(handle.events.recv().await, Some(ChannelEvent::Established));
        assert_eq!(
            handle.events.recv().await,
            Some(ChannelEvent::Message(vec![0x01, 0x02, 0x03]))
        );

        handle.write(7, b"pong".to_vec()).await.unwrap();
        assert_eq!(handle.events.recv().await, Some(ChannelEvent::Written(7)));
    });

    let initiator =
        Encryptor::initiator(EncryptionMethod::SrpChaCha20Poly1305, "alice", "s3cret!").unwrap();
    let mut handle = connect("127.0.0.1", port, initiator).await.unwrap();

    assert_eq!(handle.events.recv().await, Some(ChannelEvent::Established));

    handle.write(1, vec![0x01, 0x02, 0x03]).await.unwrap();
    assert_eq!(handle.events.recv().await, Some(ChannelEvent::Written(1)));
    assert_eq!(handle.events.recv().await, Some(ChannelEvent::Message(b"pong".to_vec())));

    handle.stop().await;
    server.await.unwrap();
}
