use once_cell::sync::Lazy;
use regex::Regex;

use crate::{DomainError, DomainResult};

/// ウォレット・アドレスの正規表現
static WALLET_ADDRESS_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

/// トランザクション・ハッシュの正規表現
static TX_HASH_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").unwrap());

/// ウォレット・アドレス
///
/// `0x`で始まる40桁の16進数で表現する。
/// チェックサム付きのアドレスを受け付けるため、大文字と小文字を保持したまま記録し、
/// 比較するときは大文字と小文字を区別しない。
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress {
    value: String,
}

impl WalletAddress {
    /// ウォレット・アドレスを構築する。
    ///
    /// # 引数
    ///
    /// * `value` - ウォレット・アドレスを表現する文字列
    ///
    /// # 戻り値
    ///
    /// ウォレット・アドレス
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let value = value.trim();
        if !WALLET_ADDRESS_EXPRESSION.is_match(value) {
            return Err(DomainError::Validation(
                format!("ウォレット・アドレスの形式が間違っています。({})", value).into(),
            ));
        }

        Ok(Self {
            value: value.to_string(),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 小文字に変換したウォレット・アドレスを返す。
    pub fn to_lowercase(&self) -> String {
        self.value.to_lowercase()
    }
}

impl PartialEq for WalletAddress {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq_ignore_ascii_case(&other.value)
    }
}

impl Eq for WalletAddress {}

impl std::hash::Hash for WalletAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_lowercase().hash(state);
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.value
    }
}

/// Farcaster ID
///
/// Farcasterのユーザーを識別する正の整数である。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Fid {
    value: u64,
}

impl Fid {
    /// Farcaster IDを構築する。
    ///
    /// # 引数
    ///
    /// * `value` - Farcaster ID
    ///
    /// # 戻り値
    ///
    /// Farcaster ID
    pub fn new(value: u64) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::Validation(
                "Farcaster IDは正の整数でなければなりません。".into(),
            ));
        }

        Ok(Self { value })
    }

    /// 文字列からFarcaster IDを構築する。
    ///
    /// # 引数
    ///
    /// * `value` - Farcaster IDを表現する文字列
    ///
    /// # 戻り値
    ///
    /// Farcaster ID
    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim().parse::<u64>().map_err(|_| {
            DomainError::Validation(
                format!("Farcaster IDを数値に変換できません。({})", value).into(),
            )
        })?;

        Self::new(value)
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl std::fmt::Display for Fid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<u64> for Fid {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fid> for u64 {
    fn from(value: Fid) -> Self {
        value.value
    }
}

/// トランザクション・ハッシュ
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash {
    value: String,
}

impl TxHash {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if !TX_HASH_EXPRESSION.is_match(&value) {
            return Err(DomainError::Validation(
                format!("トランザクション・ハッシュの形式が間違っています。({})", value).into(),
            ));
        }

        Ok(Self { value })
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x1234567890AbcdEF1234567890aBcdef12345678";

    /// 妥当な文字列からウォレット・アドレスを構築できることを確認
    #[test]
    fn construct_wallet_address_from_valid_string() {
        let address = WalletAddress::new(format!(" {} ", ADDRESS)).unwrap();
        assert_eq!(ADDRESS, address.value());
    }

    /// 妥当でない文字列からウォレット・アドレスを構築できないことを確認
    #[test]
    fn can_not_construct_wallet_address_from_invalid_strings() {
        let candidates = [
            "",
            "0x",
            "1234567890abcdef1234567890abcdef12345678",
            "0x1234567890abcdef1234567890abcdef1234567",
            "0x1234567890abcdef1234567890abcdef123456789",
            "0xg234567890abcdef1234567890abcdef12345678",
        ];
        for candidate in candidates {
            assert!(WalletAddress::new(candidate).is_err(), "{}", candidate);
        }
    }

    /// 大文字と小文字を区別せずにウォレット・アドレスを比較することを確認
    #[test]
    fn wallet_addresses_are_compared_case_insensitively() {
        let checksummed = WalletAddress::new(ADDRESS).unwrap();
        let lower = WalletAddress::new(ADDRESS.to_lowercase()).unwrap();
        assert_eq!(checksummed, lower);
    }

    /// Farcaster IDを文字列から構築できることを確認
    #[test]
    fn parse_fid() {
        assert_eq!(12345, Fid::parse("12345").unwrap().value());
        assert!(Fid::parse("0").is_err());
        assert!(Fid::parse("-1").is_err());
        assert!(Fid::parse("abc").is_err());
        assert!(Fid::parse("").is_err());
    }

    /// トランザクション・ハッシュの形式を検証することを確認
    #[test]
    fn construct_tx_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(TxHash::new(hash).is_ok());
        assert!(TxHash::new("0xabc").is_err());
    }
}
