mod tests {
    use crypto_handler::SchemeHandler;
    use keychain::{Keychain, KeychainError, key_name};
    use tbls_handler::Tbls;

    #[test]
    fn test_store_and_load_public_key() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let keychain = Keychain::new(dir.path().join("keystore"));
        let handler = Tbls::normal();
        let (public, _) = handler.generate(5, 3)?;
        let name = key_name(handler.scheme_name(), 5, 3);

        let path = keychain.store_public_key(&name, public.as_ref())?;
        assert_eq!(path, dir.path().join("keystore").join("TBLS256_5_3.pub"));

        let loaded = keychain.load_public_key(&name)?;
        assert_eq!(loaded, public.marshal_binary()?);
        handler.unmarshal_public(&loaded)?;

        assert!(matches!(
            keychain.load_private_key(&name),
            Err(KeychainError::NotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_private_share_still_signs_after_reload() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let keychain = Keychain::new(dir.path());
        let handler = Tbls::normal();
        let (public, private) = handler.generate(3, 2)?;

        let mut shares = Vec::new();
        for (i, key) in private.iter().enumerate() {
            let name = format!("share_{i}");
            keychain.store_private_key(&name, key.as_ref())?;
            let key = handler.unmarshal_private(&keychain.load_private_key(&name)?)?;
            shares.push(handler.sign(b"digest", key.as_ref())?);
        }
        let signature = handler.aggregate(&shares, b"digest", public.as_ref(), 2, 3)?;
        handler.verify(&signature, b"digest", public.as_ref())?;
        Ok(())
    }

    #[test]
    fn test_files_are_hex_encoded() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let keychain = Keychain::new(dir.path());
        let (public, _) = Tbls::normal().generate(2, 1)?;
        let path = keychain.store_public_key("key", public.as_ref())?;
        let contents = std::fs::read_to_string(path)?;
        assert!(contents.chars().all(|c| c.is_ascii_hexdigit()));
        Ok(())
    }

    #[test]
    fn test_corrupt_file_fails_to_decode() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("bad.pub"), "not hex")?;
        let keychain = Keychain::new(dir.path());
        assert!(matches!(
            keychain.load_public_key("bad"),
            Err(KeychainError::Decode { .. })
        ));
        Ok(())
    }
}
