mod tests {
    use bytes::Bytes;
    use crypto_transport::{DealerSocket, FrameSink, FrameSource, PeerId, RouterSocket, TransportError};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    async fn recv_within<S: FrameSource>(source: &mut S) -> crypto_transport::Frame {
        tokio::time::timeout(RECV_TIMEOUT, source.recv())
            .await
            .expect("frame did not arrive in time")
            .expect("transport closed")
    }

    #[tokio::test]
    async fn test_tcp_round_trip_routes_reply_to_sender() -> anyhow::Result<()> {
        let token = CancellationToken::new();
        let router = RouterSocket::bind("127.0.0.1:0".parse::<SocketAddr>()?, token.clone()).await?;
        let addr = router.local_addr().expect("tcp router has an address");
        let (router_sink, mut router_source) = router.into_split();

        let (dealer_sink, mut dealer_source) = DealerSocket::connect(addr, token.clone()).await?.into_split();
        dealer_sink.send(PeerId::UPSTREAM, Bytes::from_static(b"ping")).await?;

        let frame = recv_within(&mut router_source).await;
        assert_eq!(frame.payload, Bytes::from_static(b"ping"));
        assert_ne!(frame.peer, PeerId::UPSTREAM);

        router_sink.send(frame.peer, Bytes::from_static(b"pong")).await?;
        let reply = recv_within(&mut dealer_source).await;
        assert_eq!(reply.peer, PeerId::UPSTREAM);
        assert_eq!(reply.payload, Bytes::from_static(b"pong"));

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn test_distinct_peers_get_distinct_ids() -> anyhow::Result<()> {
        let token = CancellationToken::new();
        let router = RouterSocket::in_memory(token.clone());
        let connector = router.memory_connector();
        let (router_sink, mut router_source) = router.into_split();

        let (first_sink, mut first_source) = connector.connect().await.into_split();
        let (second_sink, mut second_source) = connector.connect().await.into_split();

        first_sink.send(PeerId::UPSTREAM, Bytes::from_static(b"first")).await?;
        let first = recv_within(&mut router_source).await;
        second_sink.send(PeerId::UPSTREAM, Bytes::from_static(b"second")).await?;
        let second = recv_within(&mut router_source).await;

        assert_ne!(first.peer, second.peer);
        assert_eq!(router_sink.peers().await, vec![first.peer.min(second.peer), first.peer.max(second.peer)]);

        router_sink.send(second.peer, Bytes::from_static(b"to-second")).await?;
        router_sink.send(first.peer, Bytes::from_static(b"to-first")).await?;
        assert_eq!(recv_within(&mut first_source).await.payload, Bytes::from_static(b"to-first"));
        assert_eq!(recv_within(&mut second_source).await.payload, Bytes::from_static(b"to-second"));

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_frame_is_delivered() -> anyhow::Result<()> {
        let token = CancellationToken::new();
        let router = RouterSocket::in_memory(token.clone());
        let connector = router.memory_connector();
        let (_router_sink, mut router_source) = router.into_split();
        let (dealer_sink, _dealer_source) = connector.connect().await.into_split();

        dealer_sink.send(PeerId::UPSTREAM, Bytes::new()).await?;
        assert!(recv_within(&mut router_source).await.payload.is_empty());

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn test_send_to_unknown_peer_fails() {
        let token = CancellationToken::new();
        let (router_sink, _router_source) = RouterSocket::in_memory(token.clone()).into_split();

        let result = router_sink.send(PeerId(42), Bytes::from_static(b"lost")).await;
        assert!(matches!(result, Err(TransportError::UnknownPeer(PeerId(42)))));
    }

    #[tokio::test]
    async fn test_dealer_source_ends_when_router_stops() -> anyhow::Result<()> {
        let router_token = CancellationToken::new();
        let router = RouterSocket::in_memory(router_token.clone());
        let connector = router.memory_connector();
        let (_router_sink, _router_source) = router.into_split();
        let (_dealer_sink, mut dealer_source) = connector.connect().await.into_split();

        router_token.cancel();
        let next = tokio::time::timeout(RECV_TIMEOUT, dealer_source.recv()).await?;
        assert!(next.is_none());
        Ok(())
    }
}
