//! ラッフル・コントラクトの読み取りと書き込み
//!
//! 一括読み取りは、呼び出し記述子の一覧を構築して1回のマルチコールで読み取り、
//! 結果を位置で各ラッフルに割り当てる。

use time::OffsetDateTime;

use domain::models::errors::{ErrorResult, RawError, Severity};
use domain::models::primitives::WalletAddress;
use domain::models::raffle::{
    AssetType, CallOutcome, ContractArg, ContractCall, ContractValue, ContractWrite,
    RaffleConfig, RaffleFunction, RaffleStatus, RaffleView, TransactionReceipt,
};
use domain::repositories::contract::RaffleContractClient;

use crate::error_handlers::{dispatch, ErrorHandlers, Notifier};

/// ウォレットが接続されていないときのエラー
pub const WALLET_NOT_CONNECTED: &str = "Wallet not connected";

/// 1時間の秒数
const SECONDS_PER_HOUR: u64 = 60 * 60;

/// ラッフルと総エントリー数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleWithEntries {
    pub raffle_id: u128,
    pub raffle: Option<RaffleView>,
    pub total_entries: Option<u128>,
}

/// ウォレットのエントリー数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEntries {
    pub raffle_id: u128,
    pub entries: Option<u128>,
}

/// ウォレットが賞品を受け取ったか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeClaim {
    pub raffle_id: u128,
    pub claimed: Option<bool>,
}

/// ラッフル作成パラメーター
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRaffleParams {
    /// 賞品の種類
    pub asset_type: AssetType,
    /// 賞品のコントラクト・アドレス
    pub asset_contract: WalletAddress,
    /// 賞品のトークンID
    pub asset_token_id: u128,
    /// 賞品の量（wei）
    pub asset_amount: u128,
    /// エントリー料金（wei）
    pub entry_fee: u128,
    /// 最大エントリー数
    pub max_entries: u128,
    /// ウォレット毎の最大エントリー数
    pub max_entries_per_wallet: u128,
    /// 開催期間（時間）
    pub duration_hours: u64,
    /// 当選者数
    pub winner_count: u128,
}

/// ラッフル・コントラクト
pub struct RaffleContract<C> {
    client: C,
    address: WalletAddress,
}

impl<C> RaffleContract<C>
where
    C: RaffleContractClient,
{
    /// ラッフル・コントラクトを構築する。
    ///
    /// # 引数
    ///
    /// * `client` - ラッフル・コントラクト・クライアント
    /// * `address` - コントラクト・アドレス
    ///
    /// # 戻り値
    ///
    /// ラッフル・コントラクト
    pub fn new(client: C, address: WalletAddress) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    fn call(&self, function: RaffleFunction, args: Vec<ContractArg>) -> ContractCall {
        ContractCall {
            address: self.address.clone(),
            function,
            args,
        }
    }

    /// ラッフルを読み取る。
    pub async fn raffle_data(&self, raffle_id: u128) -> Result<RaffleView, RawError> {
        let call = self.call(RaffleFunction::GetRaffle, vec![ContractArg::Uint(raffle_id)]);
        let value = self.client.read(call).await?;

        value
            .into_raffle()
            .ok_or_else(|| unexpected_value(RaffleFunction::GetRaffle))
    }

    /// ラッフルの総エントリー数を読み取る。
    pub async fn total_entries(&self, raffle_id: u128) -> Result<u128, RawError> {
        self.read_uint(RaffleFunction::TotalEntries, vec![ContractArg::Uint(raffle_id)])
            .await
    }

    /// ラッフルの参加者を読み取る。
    pub async fn participants(&self, raffle_id: u128) -> Result<Vec<WalletAddress>, RawError> {
        self.read_addresses(RaffleFunction::GetParticipants, raffle_id)
            .await
    }

    /// ラッフルの当選者を読み取る。
    pub async fn winners(&self, raffle_id: u128) -> Result<Vec<WalletAddress>, RawError> {
        self.read_addresses(RaffleFunction::GetWinners, raffle_id)
            .await
    }

    /// 作成されたラッフルの総数を読み取る。
    pub async fn total_raffles(&self) -> Result<u128, RawError> {
        self.read_uint(RaffleFunction::TotalRaffles, vec![]).await
    }

    async fn read_uint(
        &self,
        function: RaffleFunction,
        args: Vec<ContractArg>,
    ) -> Result<u128, RawError> {
        let value = self.client.read(self.call(function, args)).await?;

        value.into_uint().ok_or_else(|| unexpected_value(function))
    }

    async fn read_addresses(
        &self,
        function: RaffleFunction,
        raffle_id: u128,
    ) -> Result<Vec<WalletAddress>, RawError> {
        let call = self.call(function, vec![ContractArg::Uint(raffle_id)]);
        let value = self.client.read(call).await?;

        value
            .into_addresses()
            .ok_or_else(|| unexpected_value(function))
    }

    /// 複数のラッフルを一括で読み取る。
    ///
    /// 結果はラッフルIDと同じ順番で、読み取りに失敗したラッフルは`None`になる。
    ///
    /// # 引数
    ///
    /// * `raffle_ids` - ラッフルID
    ///
    /// # 戻り値
    ///
    /// ラッフル
    #[tracing::instrument(name = "batch raffle data", skip(self))]
    pub async fn batch_raffle_data(
        &self,
        raffle_ids: &[u128],
    ) -> Result<Vec<Option<RaffleView>>, RawError> {
        let calls = raffle_ids
            .iter()
            .map(|id| self.call(RaffleFunction::GetRaffle, vec![ContractArg::Uint(*id)]))
            .collect();
        let outcomes = self.multicall(calls).await?;

        Ok(outcomes
            .into_iter()
            .map(|outcome| outcome.ok().and_then(ContractValue::into_raffle))
            .collect())
    }

    /// 複数のラッフルと、その総エントリー数を一括で読み取る。
    ///
    /// ラッフル毎に`getRaffle`と`totalEntries`を続けて呼び出す。
    #[tracing::instrument(name = "batch raffle data with entries", skip(self))]
    pub async fn batch_raffle_data_with_entries(
        &self,
        raffle_ids: &[u128],
    ) -> Result<Vec<RaffleWithEntries>, RawError> {
        let calls = raffle_ids
            .iter()
            .flat_map(|id| {
                [
                    self.call(RaffleFunction::GetRaffle, vec![ContractArg::Uint(*id)]),
                    self.call(RaffleFunction::TotalEntries, vec![ContractArg::Uint(*id)]),
                ]
            })
            .collect();
        let outcomes = self.multicall(calls).await?;

        let mut outcomes = outcomes.into_iter();
        let mut result = Vec::with_capacity(raffle_ids.len());
        for raffle_id in raffle_ids {
            let raffle = outcomes.next().and_then(|o| o.ok()?.into_raffle());
            let total_entries = outcomes.next().and_then(|o| o.ok()?.into_uint());
            result.push(RaffleWithEntries {
                raffle_id: *raffle_id,
                raffle,
                total_entries,
            });
        }

        Ok(result)
    }

    /// 複数のラッフルについて、ウォレットのエントリー数を一括で読み取る。
    #[tracing::instrument(name = "batch user entries", skip(self, wallet), fields(wallet = %wallet))]
    pub async fn batch_user_entries(
        &self,
        raffle_ids: &[u128],
        wallet: &WalletAddress,
    ) -> Result<Vec<UserEntries>, RawError> {
        let calls = raffle_ids
            .iter()
            .map(|id| {
                self.call(
                    RaffleFunction::EntriesPerWallet,
                    vec![ContractArg::Uint(*id), ContractArg::Address(wallet.clone())],
                )
            })
            .collect();
        let outcomes = self.multicall(calls).await?;

        Ok(raffle_ids
            .iter()
            .zip(outcomes)
            .map(|(raffle_id, outcome)| UserEntries {
                raffle_id: *raffle_id,
                entries: outcome.ok().and_then(ContractValue::into_uint),
            })
            .collect())
    }

    /// 複数のラッフルについて、ウォレットが賞品を受け取ったかを一括で読み取る。
    #[tracing::instrument(name = "batch prize claimed", skip(self, wallet), fields(wallet = %wallet))]
    pub async fn batch_prize_claimed(
        &self,
        raffle_ids: &[u128],
        wallet: &WalletAddress,
    ) -> Result<Vec<PrizeClaim>, RawError> {
        let calls = raffle_ids
            .iter()
            .map(|id| {
                self.call(
                    RaffleFunction::PrizeClaimed,
                    vec![ContractArg::Uint(*id), ContractArg::Address(wallet.clone())],
                )
            })
            .collect();
        let outcomes = self.multicall(calls).await?;

        Ok(raffle_ids
            .iter()
            .zip(outcomes)
            .map(|(raffle_id, outcome)| PrizeClaim {
                raffle_id: *raffle_id,
                claimed: outcome.ok().and_then(ContractValue::into_bool),
            })
            .collect())
    }

    /// 呼び出し記述子をまとめて1回で呼び出す。
    ///
    /// 呼び出し記述子が空の場合は呼び出さない。
    async fn multicall(&self, calls: Vec<ContractCall>) -> Result<Vec<CallOutcome>, RawError> {
        if calls.is_empty() {
            return Ok(vec![]);
        }
        let expected = calls.len();
        let outcomes = self.client.multicall(calls).await?;
        if outcomes.len() != expected {
            return Err(RawError::thrown(format!(
                "multicall returned {} results for {} contract calls",
                outcomes.len(),
                expected
            )));
        }

        Ok(outcomes)
    }

    /// ラッフル作成の書き込み記述子を構築する。
    ///
    /// 開催期間は現在日時から始まる。賞品がETHの場合は、賞品の量を送金する。
    ///
    /// # 引数
    ///
    /// * `params` - ラッフル作成パラメーター
    /// * `wallet` - 接続しているウォレット・アドレス
    /// * `now` - 現在日時
    ///
    /// # 戻り値
    ///
    /// 書き込み記述子
    pub fn create_raffle(
        &self,
        params: &CreateRaffleParams,
        wallet: Option<&WalletAddress>,
        now: OffsetDateTime,
    ) -> Result<ContractWrite, RawError> {
        let creator = require_wallet(wallet)?;
        let start_time = u64::try_from(now.unix_timestamp())
            .map_err(|_| RawError::thrown("Raffle start time is before the unix epoch"))?;
        let end_time = params
            .duration_hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|duration| start_time.checked_add(duration))
            .ok_or_else(|| RawError::thrown("Raffle duration is too long"))?;
        let config = RaffleConfig {
            creator: creator.clone(),
            asset_type: params.asset_type,
            asset_contract: params.asset_contract.clone(),
            asset_token_id: params.asset_token_id,
            asset_amount: params.asset_amount,
            entry_fee: params.entry_fee,
            max_entries: params.max_entries,
            max_entries_per_wallet: params.max_entries_per_wallet,
            start_time,
            end_time,
            winner_count: params.winner_count,
            status: RaffleStatus::Active,
        };
        let value = match params.asset_type {
            AssetType::Eth => params.asset_amount,
            AssetType::Erc20 | AssetType::Erc721 => 0,
        };

        self.write(
            RaffleFunction::CreateRaffle,
            vec![ContractArg::Config(config)],
            value,
        )
    }

    /// ラッフル参加の書き込み記述子を構築する。
    ///
    /// エントリー料金とエントリー数の積を送金する。
    pub fn enter_raffle(
        &self,
        raffle_id: u128,
        entries: u128,
        entry_fee: u128,
        wallet: Option<&WalletAddress>,
    ) -> Result<ContractWrite, RawError> {
        require_wallet(wallet)?;
        let value = entry_fee
            .checked_mul(entries)
            .ok_or_else(|| RawError::thrown("Entry cost exceeds the maximum amount"))?;

        self.write(
            RaffleFunction::EnterRaffle,
            vec![ContractArg::Uint(raffle_id), ContractArg::Uint(entries)],
            value,
        )
    }

    /// ラッフル終了の書き込み記述子を構築する。
    pub fn end_raffle(
        &self,
        raffle_id: u128,
        wallet: Option<&WalletAddress>,
    ) -> Result<ContractWrite, RawError> {
        require_wallet(wallet)?;

        self.write(
            RaffleFunction::EndRaffle,
            vec![ContractArg::Uint(raffle_id)],
            0,
        )
    }

    /// 賞品受け取りの書き込み記述子を構築する。
    pub fn claim_prize(
        &self,
        raffle_id: u128,
        wallet: Option<&WalletAddress>,
    ) -> Result<ContractWrite, RawError> {
        require_wallet(wallet)?;

        self.write(
            RaffleFunction::ClaimPrize,
            vec![ContractArg::Uint(raffle_id)],
            0,
        )
    }

    fn write(
        &self,
        function: RaffleFunction,
        args: Vec<ContractArg>,
        value: u128,
    ) -> Result<ContractWrite, RawError> {
        ContractWrite::new(self.call(function, args), value)
            .map_err(|e| RawError::thrown(e.to_string()))
    }

    /// トランザクションを送信して、ブロックに取り込まれるまで待機する。
    ///
    /// 失敗した場合は、トランザクションのエラーとして分類して通知する。
    ///
    /// # 引数
    ///
    /// * `write` - 書き込み記述子、または記述子の構築に失敗したエラー
    /// * `handlers` - エラー・ハンドラ
    /// * `context` - エラーが発生した場所
    /// * `notifier` - 通知者
    ///
    /// # 戻り値
    ///
    /// トランザクション・レシート
    pub async fn submit_transaction(
        &self,
        write: Result<ContractWrite, RawError>,
        handlers: ErrorHandlers,
        context: &str,
        notifier: &dyn Notifier,
    ) -> Result<TransactionReceipt, ErrorResult> {
        match self.send_and_wait(write).await {
            Ok(receipt) => {
                tracing::info!(hash = %receipt.hash, "[{}] transaction confirmed", context);
                notifier.notify("Transaction confirmed", Severity::Success);
                Ok(receipt)
            }
            Err(error) => Err(dispatch(
                &error,
                |e| handlers.classify_transaction_error(e),
                context,
                notifier,
            )),
        }
    }

    async fn send_and_wait(
        &self,
        write: Result<ContractWrite, RawError>,
    ) -> Result<TransactionReceipt, RawError> {
        let hash = self.client.write(write?).await?;
        let receipt = self.client.wait_for_receipt(&hash).await?;
        if !receipt.success {
            return Err(RawError::thrown(format!(
                "Transaction {} reverted",
                receipt.hash
            )));
        }

        Ok(receipt)
    }
}

fn require_wallet(wallet: Option<&WalletAddress>) -> Result<&WalletAddress, RawError> {
    wallet.ok_or_else(|| RawError::thrown(WALLET_NOT_CONNECTED))
}

fn unexpected_value(function: RaffleFunction) -> RawError {
    RawError::thrown(format!(
        "contract returned an unexpected value from `{}`",
        function.name()
    ))
}
