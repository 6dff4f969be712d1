//! BIP32 tests

use assert_matches::assert_matches;
use coin_network::{Bip32Versions, NetworkRegistry, BITCOIN};
use seedkit::bip32::{Error as Bip32Error, ExtendedKey};
use seedkit::mnemonic::Mnemonic;
use seedkit::{ChildNumber, DerivationPath, ExtendedPrivKey, ExtendedPubKey};
use secp256k1::Secp256k1;
use std::str::FromStr;

const VECTOR_1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

fn master() -> ExtendedPrivKey {
    let seed = hex::decode(VECTOR_1_SEED).unwrap();
    ExtendedPrivKey::new_master(Bip32Versions::MAINNET, &seed).unwrap()
}

#[test]
fn test_extended_key_derivation() {
    let secp = Secp256k1::new();
    let master = master();

    // m/0'
    let child = master.ckd_priv(&secp, ChildNumber::from_hardened_idx(0).unwrap()).unwrap();
    assert_eq!(child.depth, 1);
    assert_eq!(
        ExtendedPubKey::from_priv(&secp, &child).to_string(),
        "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw"
    );

    // m/0'/1
    let path = DerivationPath::from_str("m/0'/1").unwrap();
    let derived = master.derive_priv(&secp, &path).unwrap();
    assert_eq!(derived.depth, 2);
    assert_eq!(
        derived.to_string(),
        "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs"
    );
}

#[test]
fn test_derivation_path_parsing() {
    assert!(DerivationPath::from_str("m").is_ok());
    assert!(DerivationPath::from_str("m/0").is_ok());
    assert!(DerivationPath::from_str("m/0'").is_ok());
    assert!(DerivationPath::from_str("m/44'/0'/0'/0/0").is_ok());

    assert!(DerivationPath::from_str("").is_err());
    assert!(DerivationPath::from_str("n/0").is_err());
    assert!(DerivationPath::from_str("m/").is_err());
}

#[test]
fn test_extended_key_serialization() {
    let master = master();

    let serialized = master.to_string();
    let deserialized = ExtendedPrivKey::from_str(&serialized).unwrap();

    assert_eq!(master.versions, deserialized.versions);
    assert_eq!(master.depth, deserialized.depth);
    assert_eq!(master.parent_fingerprint, deserialized.parent_fingerprint);
    assert_eq!(master.child_number, deserialized.child_number);
    assert_eq!(master.chain_code, deserialized.chain_code);
}

#[test]
fn test_public_key_derivation() {
    let secp = Secp256k1::new();
    let master = master();
    let master_pub = ExtendedPubKey::from_priv(&secp, &master);

    let child_pub = master_pub.ckd_pub(&secp, ChildNumber::from_normal_idx(0).unwrap()).unwrap();
    let child_priv = master.ckd_priv(&secp, ChildNumber::from_normal_idx(0).unwrap()).unwrap();
    let child_pub_from_priv = ExtendedPubKey::from_priv(&secp, &child_priv);

    assert_eq!(child_pub.public_key, child_pub_from_priv.public_key);
    assert_eq!(child_pub, child_pub_from_priv);
}

#[test]
fn test_fingerprint_calculation() {
    let secp = Secp256k1::new();
    let master = master();

    let child = master.ckd_priv(&secp, ChildNumber::from_normal_idx(0).unwrap()).unwrap();
    assert_eq!(child.parent_fingerprint, master.fingerprint(&secp));
    // Master fingerprint of test vector 1
    assert_eq!(master.fingerprint(&secp).to_string(), "3442193e");
}

#[test]
fn test_children_are_independent() {
    let secp = Secp256k1::new();
    let master = master();
    let a = master.derive_path(&secp, "m/1").unwrap();
    let b = master.derive_path(&secp, "m/1").unwrap();
    drop(a);
    assert_eq!(b.depth, 1);
    assert_eq!(b, master.derive_path(&secp, "m/1").unwrap());
}

#[test]
fn test_extended_key_enum() {
    let secp = Secp256k1::new();
    let private = ExtendedKey::from(master());
    let public = ExtendedKey::from(private.neuter(&secp));

    let via_private = private.derive_child(&secp, 7, false).unwrap().neuter(&secp);
    let via_public = public.derive_child(&secp, 7, false).unwrap().neuter(&secp);
    assert_eq!(via_private, via_public);

    assert_matches!(
        public.derive_child(&secp, 7, true),
        Err(Bip32Error::CannotDeriveHardenedFromPublic)
    );
    assert!(private.derive_child(&secp, 7, true).unwrap().is_private());
}

#[test]
fn test_mnemonic_root_key() {
    let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    let root = Mnemonic::from_str(phrase).unwrap().to_extended_key("", &BITCOIN).unwrap();
    let encoded = root.to_string();
    assert!(encoded.starts_with("xprv"));

    let (parsed, symbols) = ExtendedPrivKey::from_base58_in(&encoded, &NetworkRegistry::builtin()).unwrap();
    assert_eq!(parsed, root);
    assert!(symbols.contains(&"BTC"));
    assert!(symbols.contains(&"LTC"));
}

#[test]
fn test_malformed_encodings() {
    assert_matches!(ExtendedPrivKey::decode(&[0u8; 77]), Err(Bip32Error::WrongExtendedKeyLength(77)));
    assert_matches!(ExtendedPrivKey::from_str("xprvnotbase58"), Err(Bip32Error::Base58(_)));

    let mut data = master().encode();
    data[45] = 0x02;
    assert_matches!(ExtendedPrivKey::decode(&data), Err(Bip32Error::InvalidPrivateKeyPrefix));
}
