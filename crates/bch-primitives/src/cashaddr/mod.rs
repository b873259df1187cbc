//! CashAddr address encoding and decoding.
//!
//! Implements the Bitcoin Cash address format: a human-readable network
//! prefix, a colon separator, and a base32 payload carrying a version
//! byte, the hash, and a 40-bit polymod checksum.
//!
//! See <https://github.com/bitcoincashorg/bitcoincash.org/blob/master/spec/cashaddr.md>

use crate::PrimitivesError;

/// The base32 alphabet used by CashAddr.
const CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Network identifier selecting the address prefix and WIF version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Bitcoin Cash mainnet (`bitcoincash:` addresses, WIF prefix 0x80).
    Mainnet,
    /// Public testnet (`bchtest:` addresses, WIF prefix 0xef).
    Testnet,
    /// Local regression test network (`bchreg:` addresses, WIF prefix 0xef).
    Regtest,
}

impl Network {
    /// Return the CashAddr human-readable prefix for this network.
    ///
    /// # Returns
    /// `"bitcoincash"`, `"bchtest"`, or `"bchreg"`.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "bitcoincash",
            Network::Testnet => "bchtest",
            Network::Regtest => "bchreg",
        }
    }

    /// Return the WIF version byte for this network.
    ///
    /// # Returns
    /// 0x80 for mainnet, 0xef for test networks.
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet | Network::Regtest => 0xef,
        }
    }

    /// Look up a network by its CashAddr prefix.
    ///
    /// # Arguments
    /// * `prefix` - The lowercase prefix string (e.g. "bitcoincash").
    ///
    /// # Returns
    /// `Some(Network)` for a known prefix, otherwise `None`.
    pub fn from_address_prefix(prefix: &str) -> Option<Network> {
        match prefix {
            "bitcoincash" => Some(Network::Mainnet),
            "bchtest" => Some(Network::Testnet),
            "bchreg" => Some(Network::Regtest),
            _ => None,
        }
    }
}

/// The address type encoded in the CashAddr version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// Pay to public key hash.
    P2pkh,
    /// Pay to script hash.
    P2sh,
}

impl AddressType {
    /// Return the type bits for the version byte (upper nibble >> 3).
    fn type_bits(&self) -> u8 {
        match self {
            AddressType::P2pkh => 0,
            AddressType::P2sh => 1,
        }
    }

    fn from_type_bits(bits: u8) -> Result<Self, PrimitivesError> {
        match bits {
            0 => Ok(AddressType::P2pkh),
            1 => Ok(AddressType::P2sh),
            other => Err(PrimitivesError::InvalidCashAddress(format!(
                "unsupported address type {}",
                other
            ))),
        }
    }
}

/// Encode a hash as a CashAddr string.
///
/// # Arguments
/// * `network` - The network selecting the address prefix.
/// * `addr_type` - P2PKH or P2SH.
/// * `hash` - The hash payload (20 bytes for Hash160; 24/28/32/40/48/56/64
///   are also permitted by the format).
///
/// # Returns
/// The full address including the prefix and separator, or an error if
/// the hash length is not permitted by the format.
pub fn encode(
    network: Network,
    addr_type: AddressType,
    hash: &[u8],
) -> Result<String, PrimitivesError> {
    let size_bits = match hash.len() {
        20 => 0u8,
        24 => 1,
        28 => 2,
        32 => 3,
        40 => 4,
        48 => 5,
        56 => 6,
        64 => 7,
        other => {
            return Err(PrimitivesError::InvalidCashAddress(format!(
                "unsupported hash length {}",
                other
            )))
        }
    };

    let version = (addr_type.type_bits() << 3) | size_bits;
    let mut payload = Vec::with_capacity(1 + hash.len());
    payload.push(version);
    payload.extend_from_slice(hash);

    let payload5 = convert_bits(&payload, 8, 5, true)?;

    let prefix = network.address_prefix();
    let mut checksum_input = expand_prefix(prefix);
    checksum_input.extend_from_slice(&payload5);
    checksum_input.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checksum_input);

    let mut out = String::with_capacity(prefix.len() + 1 + payload5.len() + 8);
    out.push_str(prefix);
    out.push(':');
    for &d in &payload5 {
        out.push(CHARSET[d as usize] as char);
    }
    for i in 0..8 {
        let d = ((checksum >> (5 * (7 - i))) & 0x1f) as usize;
        out.push(CHARSET[d] as char);
    }
    Ok(out)
}

/// Decode a CashAddr string.
///
/// Accepts addresses with or without the network prefix; when the prefix
/// is omitted, the known prefixes are tried until the checksum verifies.
///
/// # Arguments
/// * `addr` - The address string (case-insensitive, but not mixed-case).
///
/// # Returns
/// The network, address type, and hash payload, or an error for bad
/// characters, an unknown prefix, or a checksum failure.
pub fn decode(addr: &str) -> Result<(Network, AddressType, Vec<u8>), PrimitivesError> {
    if addr.chars().any(|c| c.is_uppercase()) && addr.chars().any(|c| c.is_lowercase()) {
        return Err(PrimitivesError::InvalidCashAddress(
            "mixed-case address".to_string(),
        ));
    }
    let addr = addr.to_lowercase();

    let (prefix, body) = match addr.split_once(':') {
        Some((p, b)) => (p.to_string(), b.to_string()),
        None => {
            // No prefix given; find the network whose prefix checksums.
            let mut found = None;
            for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
                let candidate = format!("{}:{}", network.address_prefix(), addr);
                if decode(&candidate).is_ok() {
                    found = Some((network.address_prefix().to_string(), addr.clone()));
                    break;
                }
            }
            found.ok_or_else(|| {
                PrimitivesError::InvalidCashAddress("checksum verification failed".to_string())
            })?
        }
    };

    let network = Network::from_address_prefix(&prefix).ok_or_else(|| {
        PrimitivesError::InvalidCashAddress(format!("unknown prefix {:?}", prefix))
    })?;

    if body.len() < 9 {
        return Err(PrimitivesError::InvalidCashAddress(
            "payload too short".to_string(),
        ));
    }

    let mut data5 = Vec::with_capacity(body.len());
    for c in body.bytes() {
        let d = CHARSET.iter().position(|&x| x == c).ok_or_else(|| {
            PrimitivesError::InvalidCashAddress(format!("invalid character {:?}", c as char))
        })?;
        data5.push(d as u8);
    }

    let mut checksum_input = expand_prefix(&prefix);
    checksum_input.extend_from_slice(&data5);
    if polymod(&checksum_input) != 0 {
        return Err(PrimitivesError::InvalidCashAddress(
            "checksum verification failed".to_string(),
        ));
    }

    let payload5 = &data5[..data5.len() - 8];
    let payload = convert_bits(payload5, 5, 8, false)?;
    if payload.is_empty() {
        return Err(PrimitivesError::InvalidCashAddress(
            "empty payload".to_string(),
        ));
    }

    let version = payload[0];
    if version & 0x80 != 0 {
        return Err(PrimitivesError::InvalidCashAddress(
            "reserved version bit set".to_string(),
        ));
    }
    let addr_type = AddressType::from_type_bits(version >> 3)?;
    let expected_len = match version & 0x07 {
        0 => 20,
        1 => 24,
        2 => 28,
        3 => 32,
        4 => 40,
        5 => 48,
        6 => 56,
        _ => 64,
    };
    let hash = payload[1..].to_vec();
    if hash.len() != expected_len {
        return Err(PrimitivesError::InvalidCashAddress(format!(
            "hash length {} does not match version (expected {})",
            hash.len(),
            expected_len
        )));
    }

    Ok((network, addr_type, hash))
}

/// Expand the prefix for checksum computation: low 5 bits of each
/// character, followed by a zero separator.
fn expand_prefix(prefix: &str) -> Vec<u8> {
    let mut out: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    out.push(0);
    out
}

/// The CashAddr BCH checksum over 5-bit values.
///
/// # Arguments
/// * `values` - Expanded prefix, payload, and checksum placeholder.
///
/// # Returns
/// The 40-bit checksum (zero for a valid full address).
fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}

/// Regroup a bit stream between group sizes.
///
/// # Arguments
/// * `data` - Input groups, each holding `from` significant bits.
/// * `from` - Bits per input group.
/// * `to` - Bits per output group.
/// * `pad` - Whether to pad the final partial group with zeros.
///
/// # Returns
/// The regrouped values, or an error if unpadded input has leftover bits.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, PrimitivesError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    let max: u32 = (1 << to) - 1;

    for &value in data {
        if (value as u32) >> from != 0 {
            return Err(PrimitivesError::InvalidCashAddress(format!(
                "value {} exceeds {} bits",
                value, from
            )));
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return Err(PrimitivesError::InvalidCashAddress(
            "invalid padding in payload".to_string(),
        ));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Translation example from the CashAddr specification.
    const SPEC_HASH: &str = "76a04053bda0a88bda5177b86a15c3b29f559873";
    const SPEC_ADDRESS: &str = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";

    #[test]
    fn test_encode_spec_vector() {
        let hash = hex::decode(SPEC_HASH).unwrap();
        let addr = encode(Network::Mainnet, AddressType::P2pkh, &hash).unwrap();
        assert_eq!(addr, SPEC_ADDRESS);
    }

    #[test]
    fn test_decode_spec_vector() {
        let (network, addr_type, hash) = decode(SPEC_ADDRESS).unwrap();
        assert_eq!(network, Network::Mainnet);
        assert_eq!(addr_type, AddressType::P2pkh);
        assert_eq!(hex::encode(hash), SPEC_HASH);
    }

    #[test]
    fn test_decode_without_prefix() {
        let (network, addr_type, hash) =
            decode("qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a").unwrap();
        assert_eq!(network, Network::Mainnet);
        assert_eq!(addr_type, AddressType::P2pkh);
        assert_eq!(hex::encode(hash), SPEC_HASH);
    }

    #[test]
    fn test_roundtrip_all_networks_and_types() {
        let hash = [0x5a; 20];
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            for addr_type in [AddressType::P2pkh, AddressType::P2sh] {
                let addr = encode(network, addr_type, &hash).unwrap();
                assert!(addr.starts_with(network.address_prefix()));
                let (n, t, h) = decode(&addr).unwrap();
                assert_eq!(n, network);
                assert_eq!(t, addr_type);
                assert_eq!(h, hash);
            }
        }
    }

    #[test]
    fn test_roundtrip_32_byte_hash() {
        let hash = [0xab; 32];
        let addr = encode(Network::Mainnet, AddressType::P2sh, &hash).unwrap();
        let (_, addr_type, h) = decode(&addr).unwrap();
        assert_eq!(addr_type, AddressType::P2sh);
        assert_eq!(h, hash);
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut addr = SPEC_ADDRESS.to_string();
        let last = addr.pop().unwrap();
        addr.push(if last == 'a' { 'q' } else { 'a' });
        assert!(decode(&addr).is_err());
    }

    #[test]
    fn test_unsupported_hash_length_rejected() {
        assert!(encode(Network::Mainnet, AddressType::P2pkh, &[0u8; 21]).is_err());
    }

    #[test]
    fn test_mixed_case_rejected() {
        assert!(decode("bitcoincash:Qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a").is_err());
    }
}
