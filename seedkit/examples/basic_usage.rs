//! Basic usage example for seedkit

use seedkit::bip85::{Bip85Application, Bip85Request};
use seedkit::logging::init_console_logging;
use seedkit::prelude::*;
use seedkit::NetworkRegistry;
use tracing::level_filters::LevelFilter;

fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    init_console_logging(LevelFilter::DEBUG)?;
    println!("Seedkit Example\n");

    // 1. Import a mnemonic
    println!("1. Importing mnemonic...");
    let seeded = SeededWallet::import(
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        "",
    )?;
    println!("   Words: {}", seeded.mnemonic().word_count());
    println!("   Language: {}", seeded.mnemonic().language());
    println!("   Seed: {}", seeded.seed());

    // 2. Root key
    println!("\n2. Deriving root key...");
    let registry = NetworkRegistry::builtin();
    let config = WalletConfig::new().with_standard(BipStandard::Bip84).with_address_range(0, 5);
    let network = seedkit::wallet::resolve_network(&registry, &config.network)?;
    let wallet = seeded.into_root(network)?;
    println!("   Root xpub: {}", ExtendedPubKey::from_priv(&secp256k1::Secp256k1::new(), wallet.root_key()));

    // 3. Addresses
    println!("\n3. Deriving {} addresses...", config.standard);
    let coords = config.coordinates(network.bip44_coin_type);
    let (path, _, xpub) = wallet.extended_keys(&coords, config.standard)?;
    println!("   Path: {}", path);
    println!("   Account xpub: {}", xpub);
    for record in wallet.derive_addresses(&coords, config.standard, config.start_index, config.address_count, false)? {
        println!("     {}: {}", record.path, record.address);
    }

    // 4. Every standard the network supports
    println!("\n4. First address per standard...");
    for standard in BipStandard::ALL {
        match wallet.derive_addresses(&coords, standard, 0, 1, false) {
            Ok(records) => println!("   {}: {}", standard, records[0].address),
            Err(e) => println!("   {}: {}", standard, e),
        }
    }

    // 5. BIP85 child mnemonic
    println!("\n5. BIP85 child mnemonic...");
    let child = wallet.derive_bip85(&Bip85Request::new(Bip85Application::Bip39, 0))?;
    println!("   Child words: {}", child.split_whitespace().count());

    Ok(())
}
