mod utils {
    use std::sync::Arc;
    use std::time::Duration;

    use config_parser::config::{ClientConfig, RouterConfig, SignerConfig};
    use crypto_client::CryptoClient;
    use crypto_handler::SchemeHandler;
    use signer_processor::{SignerHandle, SignerProcessor};
    use tokio_util::sync::CancellationToken;

    pub const WAIT: Duration = Duration::from_secs(10);

    pub async fn start_client() -> CryptoClient {
        let config = ClientConfig {
            router: RouterConfig {
                url: "127.0.0.1:0".to_string(),
            },
            request_timeout_secs: 30,
        };
        CryptoClient::bind(&config).await.expect("client must bind")
    }

    /// Connects a signer over TCP and returns once all its schemes are registered.
    pub async fn start_signer(client: &CryptoClient, handlers: Vec<Arc<dyn SchemeHandler>>) -> SignerHandle {
        let addr = client.local_addr().expect("client is bound to TCP");
        let mut processor = SignerProcessor::new(SignerConfig {
            router: RouterConfig { url: addr.to_string() },
            workers: 4,
            queue_size: 16,
        });
        for handler in handlers {
            processor.add_handler(handler).expect("unique schemes");
        }
        processor
            .start(CancellationToken::new())
            .await
            .expect("signer must start")
    }
}

mod tests {
    use super::utils::*;
    use crypto_client::ClientError;
    use crypto_handler::SchemeHandler;
    use crypto_handler::mocks::MockHandler;
    use crypto_proto::MessageType;
    use quorum_recovery::RecoveryError;
    use rsa_handler::{RSA1024, Rsa};
    use std::sync::Arc;
    use tbls_handler::{TBLS256, TBLS256_OPTIMISTIC, TBLS256_PESSIMISTIC, Tbls};

    const DIGEST: &[u8] = b"Hello World";

    async fn sign_with(
        client: &crypto_client::CryptoClient,
        scheme: &str,
        keys: &[Vec<u8>],
    ) -> anyhow::Result<Vec<Vec<u8>>> {
        let mut shares = Vec::with_capacity(keys.len());
        for key in keys {
            shares.push(client.sign(scheme, DIGEST, key).await?);
        }
        Ok(shares)
    }

    #[tokio::test]
    async fn test_generate_sign_aggregate_verify() -> anyhow::Result<()> {
        let client = start_client().await;
        let signer = start_signer(&client, tbls_handler::all_handlers()).await;
        client.wait_for_scheme(TBLS256, WAIT).await?;

        let (public, private) = client.generate(TBLS256, 10, 6).await?;
        assert_eq!(private.len(), 10);

        let shares = sign_with(&client, TBLS256, &private[..6]).await?;
        let signature = client.aggregate(TBLS256, &shares, DIGEST, &public, 6, 10).await?;
        client.verify(TBLS256, &signature, DIGEST, &public).await?;

        let err = client
            .verify(TBLS256, &signature, b"another message", &public)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::OperationFailed {
                operation: MessageType::VerifyRequest,
                ..
            }
        ));

        signer.shutdown().await?;
        client.shutdown();
        Ok(())
    }

    #[tokio::test]
    async fn test_too_few_shares_fail_for_every_policy() -> anyhow::Result<()> {
        let client = start_client().await;
        let signer = start_signer(&client, tbls_handler::all_handlers()).await;
        client.wait_for_scheme(TBLS256_PESSIMISTIC, WAIT).await?;

        let (public, private) = client.generate(TBLS256, 10, 6).await?;
        let shares = sign_with(&client, TBLS256, &private[..5]).await?;

        for scheme in [TBLS256, TBLS256_OPTIMISTIC, TBLS256_PESSIMISTIC] {
            let err = client
                .aggregate(scheme, &shares, DIGEST, &public, 6, 10)
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::OperationFailed { .. }), "{scheme}: {err}");
        }

        // the wire only carries the status; the cause is visible on the handler itself
        let handler = Tbls::normal();
        let key = handler.unmarshal_public(&public)?;
        let err = handler.aggregate(&shares, DIGEST, key.as_ref(), 6, 10).unwrap_err();
        assert!(matches!(
            err,
            crypto_handler::HandlerError::Recovery(RecoveryError::InsufficientShares { got: 5, need: 6 })
        ));

        signer.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_forged_shares_by_policy() -> anyhow::Result<()> {
        let client = start_client().await;
        let signer = start_signer(&client, tbls_handler::all_handlers()).await;
        client.wait_for_scheme(TBLS256_PESSIMISTIC, WAIT).await?;

        let (public, private) = client.generate(TBLS256, 10, 6).await?;
        let (_, foreign) = client.generate(TBLS256, 10, 6).await?;

        // five genuine shares followed by two shares of the same indices from another key set
        let mut shares = sign_with(&client, TBLS256, &private[..5]).await?;
        shares.extend(sign_with(&client, TBLS256, &foreign[5..7]).await?);

        for scheme in [TBLS256_OPTIMISTIC, TBLS256_PESSIMISTIC] {
            assert!(client.aggregate(scheme, &shares, DIGEST, &public, 6, 10).await.is_err());
        }

        let pessimistic = Tbls::pessimistic();
        let key = pessimistic.unmarshal_public(&public)?;
        assert!(matches!(
            pessimistic.aggregate(&shares, DIGEST, key.as_ref(), 6, 10).unwrap_err(),
            crypto_handler::HandlerError::Recovery(RecoveryError::InsufficientValidShares { valid: 5, need: 6 })
        ));
        let optimistic = Tbls::optimistic();
        assert!(matches!(
            optimistic.aggregate(&shares, DIGEST, key.as_ref(), 6, 10).unwrap_err(),
            crypto_handler::HandlerError::Recovery(RecoveryError::NoValidCombination { attempts: 7 })
        ));

        // one more genuine share lets both strategies recover
        shares.push(client.sign(TBLS256, DIGEST, &private[9]).await?);
        for scheme in [TBLS256_OPTIMISTIC, TBLS256_PESSIMISTIC] {
            let signature = client.aggregate(scheme, &shares, DIGEST, &public, 6, 10).await?;
            client.verify(TBLS256, &signature, DIGEST, &public).await?;
        }

        signer.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_rsa_sign_and_verify() -> anyhow::Result<()> {
        let client = start_client().await;
        let signer = start_signer(&client, vec![Arc::new(Rsa::new(1024)) as Arc<dyn SchemeHandler>]).await;
        client.wait_for_scheme(RSA1024, WAIT).await?;

        let (public, private) = client.generate(RSA1024, 4, 2).await?;
        assert_eq!(private.len(), 1);
        let signature = client.sign(RSA1024, DIGEST, &private[0]).await?;
        client.verify(RSA1024, &signature, DIGEST, &public).await?;

        let err = client
            .aggregate(RSA1024, &[signature], DIGEST, &public, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::OperationFailed {
                operation: MessageType::AggregateRequest,
                ..
            }
        ));

        signer.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_requests_route_to_the_registering_signer() -> anyhow::Result<()> {
        let client = start_client().await;
        let tbls_signer = start_signer(&client, vec![Arc::new(Tbls::normal()) as Arc<dyn SchemeHandler>]).await;
        let mock_signer = start_signer(&client, vec![Arc::new(MockHandler::new("Mock")) as Arc<dyn SchemeHandler>]).await;
        client.wait_for_scheme("Mock", WAIT).await?;
        assert_eq!(
            client.registered_schemes().await?,
            vec!["Mock".to_string(), TBLS256.to_string()]
        );

        let calls = (0..16u8).map(|i| {
            let client = client.clone();
            async move { (i, client.sign("Mock", &[i], b"key").await) }
        });
        for (i, result) in futures::future::join_all(calls).await {
            assert_eq!(result?, [&[i][..], &b"key"[..]].concat());
        }

        let (public, _) = client.generate(TBLS256, 3, 2).await?;
        assert!(!public.is_empty());

        let err = client.sign("Unknown", DIGEST, b"key").await.unwrap_err();
        assert!(matches!(err, ClientError::SchemeNotRegistered(_)));

        tbls_signer.shutdown().await?;
        mock_signer.shutdown().await?;
        Ok(())
    }
}
