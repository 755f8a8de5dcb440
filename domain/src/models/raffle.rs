use crate::models::errors::RawError;
use crate::models::primitives::WalletAddress;
use crate::{DomainError, DomainResult};

/// 景品の資産の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AssetType {
    /// ネイティブ・コイン
    Eth,
    /// ERC-20トークン
    Erc20,
    /// ERC-721トークン
    Erc721,
}

impl TryFrom<u8> for AssetType {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Eth),
            1 => Ok(Self::Erc20),
            2 => Ok(Self::Erc721),
            _ => Err(DomainError::Validation(
                format!("資産の種類を示す値ではありません。({})", value).into(),
            )),
        }
    }
}

impl From<AssetType> for u8 {
    fn from(value: AssetType) -> Self {
        match value {
            AssetType::Eth => 0,
            AssetType::Erc20 => 1,
            AssetType::Erc721 => 2,
        }
    }
}

/// ラッフルの状態
///
/// 状態はコントラクトのみが遷移させ、クライアントは読み取るだけである。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RaffleStatus {
    /// 受付中
    Active,
    /// 終了
    Ended,
    /// 中止
    Cancelled,
}

impl TryFrom<u8> for RaffleStatus {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Active),
            1 => Ok(Self::Ended),
            2 => Ok(Self::Cancelled),
            _ => Err(DomainError::Validation(
                format!("ラッフルの状態を示す値ではありません。({})", value).into(),
            )),
        }
    }
}

impl From<RaffleStatus> for u8 {
    fn from(value: RaffleStatus) -> Self {
        match value {
            RaffleStatus::Active => 0,
            RaffleStatus::Ended => 1,
            RaffleStatus::Cancelled => 2,
        }
    }
}

/// ラッフル設定
///
/// コントラクトの`createRaffle`に渡すタプルと、`getRaffle`が返すタプルは同じ構造である。
/// 金額はwei単位、日時はUNIX時間（秒）で表現する。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleConfig {
    /// 作成者
    pub creator: WalletAddress,
    /// 資産の種類
    pub asset_type: AssetType,
    /// 資産のコントラクト・アドレス
    pub asset_contract: WalletAddress,
    /// トークンID
    pub asset_token_id: u128,
    /// 資産の量
    pub asset_amount: u128,
    /// 参加費
    pub entry_fee: u128,
    /// 最大参加数
    pub max_entries: u128,
    /// ウォレット毎の最大参加数
    pub max_entries_per_wallet: u128,
    /// 開始日時
    pub start_time: u64,
    /// 終了日時
    pub end_time: u64,
    /// 当選者数
    pub winner_count: u128,
    /// 状態
    pub status: RaffleStatus,
}

/// ラッフル
///
/// オンチェーンのラッフルの状態を読み取った射影で、コントラクトが所有する。
pub type RaffleView = RaffleConfig;

/// ラッフル・コントラクトの関数の状態可変性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateMutability {
    /// 送金を伴う書き込み
    Payable,
    /// 送金を伴わない書き込み
    NonPayable,
    /// 読み取り
    View,
}

/// ラッフル・コントラクトの関数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaffleFunction {
    CreateRaffle,
    EnterRaffle,
    EndRaffle,
    ClaimPrize,
    GetRaffle,
    GetParticipants,
    GetWinners,
    TotalEntries,
    EntriesPerWallet,
    PrizeClaimed,
    TotalRaffles,
}

impl RaffleFunction {
    /// ABIに記録された関数名を返す。
    pub fn name(&self) -> &'static str {
        match self {
            RaffleFunction::CreateRaffle => "createRaffle",
            RaffleFunction::EnterRaffle => "enterRaffle",
            RaffleFunction::EndRaffle => "endRaffle",
            RaffleFunction::ClaimPrize => "claimPrize",
            RaffleFunction::GetRaffle => "getRaffle",
            RaffleFunction::GetParticipants => "getParticipants",
            RaffleFunction::GetWinners => "getWinners",
            RaffleFunction::TotalEntries => "totalEntries",
            RaffleFunction::EntriesPerWallet => "entriesPerWallet",
            RaffleFunction::PrizeClaimed => "prizeClaimed",
            RaffleFunction::TotalRaffles => "totalRaffles",
        }
    }

    /// 関数シグネチャを返す。
    pub fn signature(&self) -> &'static str {
        match self {
            RaffleFunction::CreateRaffle => "createRaffle((address,uint8,address,uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint8))",
            RaffleFunction::EnterRaffle => "enterRaffle(uint256,uint256)",
            RaffleFunction::EndRaffle => "endRaffle(uint256)",
            RaffleFunction::ClaimPrize => "claimPrize(uint256)",
            RaffleFunction::GetRaffle => "getRaffle(uint256)",
            RaffleFunction::GetParticipants => "getParticipants(uint256)",
            RaffleFunction::GetWinners => "getWinners(uint256)",
            RaffleFunction::TotalEntries => "totalEntries(uint256)",
            RaffleFunction::EntriesPerWallet => "entriesPerWallet(uint256,address)",
            RaffleFunction::PrizeClaimed => "prizeClaimed(uint256,address)",
            RaffleFunction::TotalRaffles => "totalRaffles()",
        }
    }

    pub fn state_mutability(&self) -> StateMutability {
        match self {
            RaffleFunction::CreateRaffle | RaffleFunction::EnterRaffle => {
                StateMutability::Payable
            }
            RaffleFunction::EndRaffle | RaffleFunction::ClaimPrize => StateMutability::NonPayable,
            _ => StateMutability::View,
        }
    }

    /// 読み取り専用の関数であるか確認する。
    pub fn is_view(&self) -> bool {
        self.state_mutability() == StateMutability::View
    }
}

/// ラッフル・コントラクトのイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaffleEvent {
    /// `RaffleCreated(uint256 indexed raffleId, address indexed creator, uint8 assetType, uint256 entryFee)`
    RaffleCreated,
    /// `RaffleEntered(uint256 indexed raffleId, address indexed participant, uint256 entries)`
    RaffleEntered,
}

impl RaffleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RaffleEvent::RaffleCreated => "RaffleCreated",
            RaffleEvent::RaffleEntered => "RaffleEntered",
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            RaffleEvent::RaffleCreated => "RaffleCreated(uint256,address,uint8,uint256)",
            RaffleEvent::RaffleEntered => "RaffleEntered(uint256,address,uint256)",
        }
    }
}

/// コントラクト関数の引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractArg {
    /// `uint256`
    Uint(u128),
    /// `address`
    Address(WalletAddress),
    /// ラッフル設定のタプル
    Config(RaffleConfig),
}

/// コントラクト関数の呼び出し記述子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// コントラクト・アドレス
    pub address: WalletAddress,
    /// 関数
    pub function: RaffleFunction,
    /// 引数
    pub args: Vec<ContractArg>,
}

/// コントラクトへの書き込み記述子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractWrite {
    /// 呼び出し記述子
    pub call: ContractCall,
    /// 送金額（wei）
    pub value: u128,
}

impl ContractWrite {
    /// 書き込み記述子を構築する。
    ///
    /// 送金を伴わない関数に送金額を指定した場合はエラーを返す。
    pub fn new(call: ContractCall, value: u128) -> DomainResult<Self> {
        match call.function.state_mutability() {
            StateMutability::View => Err(DomainError::DomainRule(
                format!("`{}`は読み取り専用の関数です。", call.function.name()).into(),
            )),
            StateMutability::NonPayable if value != 0 => Err(DomainError::DomainRule(
                format!("`{}`に送金することはできません。", call.function.name()).into(),
            )),
            _ => Ok(Self { call, value }),
        }
    }
}

/// コントラクト関数の戻り値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractValue {
    /// ラッフル
    Raffle(RaffleView),
    /// `uint256`
    Uint(u128),
    /// `address[]`
    Addresses(Vec<WalletAddress>),
    /// `bool`
    Bool(bool),
}

impl ContractValue {
    pub fn into_raffle(self) -> Option<RaffleView> {
        match self {
            ContractValue::Raffle(raffle) => Some(raffle),
            _ => None,
        }
    }

    pub fn into_uint(self) -> Option<u128> {
        match self {
            ContractValue::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_addresses(self) -> Option<Vec<WalletAddress>> {
        match self {
            ContractValue::Addresses(addresses) => Some(addresses),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            ContractValue::Bool(value) => Some(value),
            _ => None,
        }
    }
}

/// 一括読み取りに含まれる、個々の呼び出し結果
pub type CallOutcome = Result<ContractValue, RawError>;

/// トランザクション・レシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// トランザクション・ハッシュ
    pub hash: crate::models::primitives::TxHash,
    /// トランザクションが成功したか
    pub success: bool,
}
