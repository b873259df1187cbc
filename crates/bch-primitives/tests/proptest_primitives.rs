use proptest::prelude::*;

use bch_primitives::cashaddr::{self, AddressType, Network};
use bch_primitives::ec::PrivateKey;
use bch_primitives::hash::sha256;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn private_key_wif_and_address_roundtrip(seed in prop::array::uniform32(any::<u8>())) {
        // Not all 32-byte arrays are valid private keys (must be < curve order, nonzero).
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let wif = pk.to_wif(Network::Mainnet);
            let pk2 = PrivateKey::from_wif(&wif).unwrap();
            prop_assert_eq!(pk.to_hex(), pk2.to_hex());

            let address = pk.pub_key().to_address(Network::Mainnet).unwrap();
            let (network, addr_type, hash) = cashaddr::decode(&address).unwrap();
            prop_assert_eq!(network, Network::Mainnet);
            prop_assert_eq!(addr_type, AddressType::P2pkh);
            prop_assert_eq!(hash, pk.pub_key().hash160().to_vec());
        }
    }

    #[test]
    fn ecdsa_sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = pk.sign(&hash).unwrap();
            prop_assert!(pk.pub_key().verify(&hash, &sig));
        }
    }

    #[test]
    fn cashaddr_hash_roundtrip(hash in prop::array::uniform32(any::<u8>())) {
        let addr = cashaddr::encode(Network::Mainnet, AddressType::P2sh, &hash).unwrap();
        let (_, _, decoded) = cashaddr::decode(&addr).unwrap();
        prop_assert_eq!(decoded, hash.to_vec());
    }
}
