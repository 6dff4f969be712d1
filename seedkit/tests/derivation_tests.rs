//! Derivation tests

use assert_matches::assert_matches;
use coin_network::{BITCOIN, BITCOIN_TESTNET, DOGECOIN, LITECOIN};
use seedkit::derivation::{address_path, build_path, BipStandard, DerivationCoordinates};
use seedkit::wallet::{HdWallet, SeededWallet};
use seedkit::{AddressError, Error, WalletConfig};

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn wallet(network: &coin_network::NetworkParameters) -> HdWallet {
    SeededWallet::import(ABANDON, "").unwrap().into_root(network).unwrap()
}

fn first_address(wallet: &HdWallet, coin: u32, standard: BipStandard, change: u32, index: u32) -> String {
    let coords = DerivationCoordinates::new(coin, 0, change);
    let records = wallet.derive_addresses(&coords, standard, index, 1, false).unwrap();
    records[0].address.clone()
}

#[test]
fn test_path_determinism() {
    let coords = DerivationCoordinates::new(0, 0, 0);
    let base = build_path(&coords, BipStandard::Bip44).unwrap();
    assert_eq!(base, "m/44'/0'/0'/0");
    assert_eq!(address_path(&base, 5, false), "m/44'/0'/0'/0/5");
}

#[test]
fn test_bip44_vector() {
    let wallet = wallet(&BITCOIN);
    assert_eq!(first_address(&wallet, 0, BipStandard::Bip44, 0, 0), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
}

#[test]
fn test_bip49_vectors() {
    assert_eq!(
        first_address(&wallet(&BITCOIN), 0, BipStandard::Bip49, 0, 0),
        "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf"
    );
    assert_eq!(
        first_address(&wallet(&BITCOIN_TESTNET), 1, BipStandard::Bip49, 0, 0),
        "2Mww8dCYPUpKHofjgcXcBCEGmniw9CoaiD2"
    );
}

#[test]
fn test_bip84_vectors() {
    let wallet = wallet(&BITCOIN);
    assert_eq!(
        first_address(&wallet, 0, BipStandard::Bip84, 0, 0),
        "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
    );
    assert_eq!(
        first_address(&wallet, 0, BipStandard::Bip84, 0, 1),
        "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g"
    );
    assert_eq!(
        first_address(&wallet, 0, BipStandard::Bip84, 1, 0),
        "bc1q8c6fshw2dlwun7ekn9qwf37cu2rn755upcp6el"
    );
}

#[test]
fn test_bip84_record_keys() {
    let wallet = wallet(&BITCOIN);
    let records = wallet
        .derive_addresses(&DerivationCoordinates::new(0, 0, 0), BipStandard::Bip84, 0, 1, false)
        .unwrap();
    let record = &records[0];
    assert_eq!(record.path, "m/84'/0'/0'/0/0");
    assert_eq!(record.public_key_hex, "0330d54fd0dd420a6e5f8d3624f5f3482cae350f79d5f0753bf5beef9c2d91af3c");
    assert_eq!(record.wif, "KyZpNDKnfs94vbrwhJneDi77V6jF64PWPF8x5cdJb8ifgg2DUc9d");
    assert_eq!(record.private_key_hex.len(), 64);
}

#[test]
fn test_batch_shares_base_path() {
    let wallet = wallet(&BITCOIN);
    let records = wallet
        .derive_addresses(&DerivationCoordinates::new(0, 0, 0), BipStandard::Bip44, 10, 3, false)
        .unwrap();

    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["m/44'/0'/0'/0/10", "m/44'/0'/0'/0/11", "m/44'/0'/0'/0/12"]);

    // Same result one index at a time
    for record in &records {
        assert_eq!(first_address(&wallet, 0, BipStandard::Bip44, 0, record.index), record.address);
    }
}

#[test]
fn test_hardened_addresses() {
    let wallet = wallet(&BITCOIN);
    let coords = DerivationCoordinates::new(0, 0, 0);
    let hardened = wallet.derive_addresses(&coords, BipStandard::Bip32, 0, 2, true).unwrap();
    let normal = wallet.derive_addresses(&coords, BipStandard::Bip32, 0, 2, false).unwrap();

    assert_eq!(hardened[1].path, "m/0/0/1'");
    assert_eq!(normal[1].path, "m/0/0/1");
    assert_ne!(hardened[1].address, normal[1].address);
}

#[test]
fn test_bip141_uses_native_segwit() {
    let wallet = wallet(&LITECOIN);
    let records = wallet
        .derive_addresses(&DerivationCoordinates::new(2, 0, 0), BipStandard::Bip141, 0, 1, false)
        .unwrap();
    assert_eq!(records[0].path, "m/0/0");
    assert!(records[0].address.starts_with("ltc1q"));
}

#[test]
fn test_capability_gating() {
    let wallet = wallet(&DOGECOIN);
    let coords = DerivationCoordinates::new(3, 0, 0);
    assert_matches!(
        wallet.derive_addresses(&coords, BipStandard::Bip84, 0, 1, false),
        Err(Error::Address(AddressError::UnsupportedCapability { .. }))
    );

    let legacy = wallet.derive_addresses(&coords, BipStandard::Bip44, 0, 1, false).unwrap();
    assert!(legacy[0].address.starts_with('D'));
}

#[test]
fn test_extended_keys_at_account_chain() {
    let wallet = wallet(&BITCOIN);
    let (path, xprv, xpub) =
        wallet.extended_keys(&DerivationCoordinates::new(0, 0, 0), BipStandard::Bip44).unwrap();
    assert_eq!(path, "m/44'/0'/0'/0");
    assert_eq!(xprv.depth, 4);
    assert!(xprv.to_string().starts_with("xprv"));
    assert!(xpub.to_string().starts_with("xpub"));
}

#[test]
fn test_snapshot_matches_config() {
    let wallet = wallet(&BITCOIN);
    let snapshot = wallet.snapshot(&WalletConfig::new().with_standard(BipStandard::Bip84)).unwrap();
    assert_eq!(snapshot.mnemonic, ABANDON);
    assert_eq!(snapshot.derivation_path, "m/84'/0'/0'/0");
    assert_eq!(snapshot.addresses.len(), 20);
    assert_eq!(snapshot.addresses[0].address, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
    assert!(snapshot.seed.starts_with("5eb00bbddcf06908"));
}
