use std::path::PathBuf;

use clap::Parser;
use crypto_handler::SchemeHandler;
use eyre::{Result, eyre};
use global_utils::logger::init_logger;
use keychain::{Keychain, key_name};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates a threshold key set and writes one keychain per participant")]
struct Args {
    /// Scheme to generate keys for
    #[arg(short, long, default_value = tbls_handler::TBLS256)]
    scheme: String,

    /// Number of shares
    #[arg(short, long = "shares", default_value_t = 5)]
    n: usize,

    /// Shares required to produce a signature
    #[arg(short, long = "threshold", default_value_t = 3)]
    t: usize,

    /// Output directory; participant `i` is written to `<path>/<i>/`
    #[arg(short, long, default_value = "./resources/keys/")]
    path: PathBuf,
}

fn main() -> Result<()> {
    let _logger_guard = init_logger();
    let args = Args::parse();

    let handler = tbls_handler::handler_for(&args.scheme)
        .or_else(|| rsa_handler::handler_for(&args.scheme))
        .ok_or_else(|| eyre!("Unknown scheme '{}'", args.scheme))?;
    let (public, private) = handler.generate(args.n, args.t)?;
    if private.len() != args.n {
        warn!(requested = args.n, generated = private.len(), "Scheme produced a different number of shares");
    }

    let name = key_name(handler.scheme_name(), args.n, args.t);
    for (i, key) in private.iter().enumerate() {
        let keychain = Keychain::new(args.path.join((i + 1).to_string()));
        keychain.store_public_key(&name, public.as_ref())?;
        keychain.store_private_key(&name, key.as_ref())?;
    }
    info!(scheme = args.scheme, name, path = %args.path.display(), shares = private.len(), "Keys written");
    Ok(())
}
