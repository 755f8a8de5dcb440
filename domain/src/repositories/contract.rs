use async_trait::async_trait;

use crate::models::errors::RawError;
use crate::models::primitives::TxHash;
use crate::models::raffle::{
    CallOutcome, ContractCall, ContractValue, ContractWrite, TransactionReceipt,
};

/// ラッフル・コントラクト・クライアント
///
/// ブロックチェーンRPCライブラリを包むポートである。
/// 失敗した場合は、エラー分類器に渡せるように分類前のエラーを返す。
#[async_trait]
pub trait RaffleContractClient: Send + Sync {
    /// コントラクトの読み取り関数を呼び出す。
    ///
    /// # 引数
    ///
    /// * `call` - 呼び出し記述子
    ///
    /// # 戻り値
    ///
    /// 関数の戻り値
    async fn read(&self, call: ContractCall) -> Result<ContractValue, RawError>;

    /// 複数の読み取り関数を、1回のネットワーク往復で呼び出す。
    ///
    /// # 引数
    ///
    /// * `calls` - 呼び出し記述子
    ///
    /// # 戻り値
    ///
    /// 呼び出し記述子と同じ順番の呼び出し結果
    async fn multicall(&self, calls: Vec<ContractCall>) -> Result<Vec<CallOutcome>, RawError>;

    /// コントラクトの書き込み関数を呼び出す。
    ///
    /// # 引数
    ///
    /// * `write` - 書き込み記述子
    ///
    /// # 戻り値
    ///
    /// トランザクション・ハッシュ
    async fn write(&self, write: ContractWrite) -> Result<TxHash, RawError>;

    /// トランザクションがブロックに取り込まれるまで待機する。
    ///
    /// # 引数
    ///
    /// * `hash` - トランザクション・ハッシュ
    ///
    /// # 戻り値
    ///
    /// トランザクション・レシート
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TransactionReceipt, RawError>;
}
