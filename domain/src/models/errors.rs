use enum_display::EnumDisplay;

/// エラー分類
///
/// 外部から受け取ったエラーを分類した結果を表現する閉じた集合である。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// ユーザーが署名やトランザクションを拒否した
    UserRejected,
    /// 残高不足
    InsufficientFunds,
    /// ネットワーク・エラー
    NetworkError,
    /// コントラクトの実行エラー
    ContractError,
    /// ウォレットの接続エラー
    WalletError,
    /// APIエラー
    ApiError,
    /// レート制限
    RateLimit,
    /// 見つからない
    NotFound,
    /// 認証エラー
    AuthenticationError,
    /// 設定エラー
    ConfigurationError,
    /// 不明なエラー
    UnknownError,
}

// 表示する文字列は`serde`でシリアライズした名前と一致させる。
impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match *self {
            ErrorKind::UserRejected => "USER_REJECTED",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::ContractError => "CONTRACT_ERROR",
            ErrorKind::WalletError => "WALLET_ERROR",
            ErrorKind::ApiError => "API_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AuthenticationError => "AUTHENTICATION_ERROR",
            ErrorKind::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// 通知の重要度
///
/// トースト通知の種類に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay)]
#[enum_display(case = "Lower")]
pub enum Severity {
    /// 成功
    Success,
    /// 情報
    Info,
    /// 警告
    Warning,
    /// エラー
    Error,
}

/// エラー・コード
///
/// ウォレットやJSON-RPCは数値でエラー・コードを返すが、文字列で返すライブラリもある。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// 数値のエラー・コード
    Numeric(i64),
    /// 文字列のエラー・コード
    Text(String),
}

impl ErrorCode {
    /// エラー・コードが指定した数値と一致するか確認する。
    ///
    /// 文字列のエラー・コードは、数値に変換できる場合に比較する。
    ///
    /// # 引数
    ///
    /// * `expected` - 比較する数値
    ///
    /// # 戻り値
    ///
    /// 一致する場合は`true`
    pub fn is(&self, expected: i64) -> bool {
        match self {
            ErrorCode::Numeric(value) => *value == expected,
            ErrorCode::Text(value) => value.trim().parse::<i64>().ok() == Some(expected),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Numeric(value) => write!(f, "{}", value),
            ErrorCode::Text(value) => write!(f, "{}", value),
        }
    }
}

/// エラーの詳細
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ErrorDetail {
    /// メッセージ
    pub message: Option<String>,
    /// エラー・コード
    pub code: Option<ErrorCode>,
    /// HTTPステータス・コード
    pub status: Option<u16>,
}

impl ErrorDetail {
    /// メッセージを持つエラーの詳細を構築する。
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// エラー・コードを設定する。
    pub fn code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// HTTPステータス・コードを設定する。
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// 外部呼び出しの境界で受け取った、分類前のエラー
///
/// 実行時に形状を調べる代わりに、境界でいずれかの形に変換する。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawError {
    /// エラーとして送出された値
    Thrown(ErrorDetail),
    /// エラーではないが、メッセージまたはエラー・コードを持つ値
    Shaped(ErrorDetail),
    /// 上記以外の値
    Opaque,
}

impl RawError {
    /// メッセージを持つ、送出されたエラーを構築する。
    ///
    /// # 引数
    ///
    /// * `message` - メッセージ
    ///
    /// # 戻り値
    ///
    /// 分類前のエラー
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::Thrown(ErrorDetail::with_message(message))
    }

    /// エラーの詳細を返す。
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            RawError::Thrown(detail) | RawError::Shaped(detail) => Some(detail),
            RawError::Opaque => None,
        }
    }

    /// メッセージを返す。
    pub fn message(&self) -> Option<&str> {
        self.detail().and_then(|d| d.message.as_deref())
    }

    /// 小文字に変換したメッセージを返す。
    ///
    /// メッセージがない場合は空文字列を返す。
    pub fn lowercase_message(&self) -> String {
        self.message().map(str::to_lowercase).unwrap_or_default()
    }

    /// エラー・コードを返す。
    pub fn code(&self) -> Option<&ErrorCode> {
        self.detail().and_then(|d| d.code.as_ref())
    }

    /// HTTPステータス・コードを返す。
    pub fn status(&self) -> Option<u16> {
        self.detail().and_then(|d| d.status)
    }

    /// 送出されたエラーであるか確認する。
    pub fn is_thrown(&self) -> bool {
        matches!(self, RawError::Thrown(_))
    }
}

impl std::fmt::Display for RawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) => {
                write!(f, "{}", detail.message.as_deref().unwrap_or("<no message>"))?;
                if let Some(code) = &detail.code {
                    write!(f, " (code={})", code)?;
                }
                if let Some(status) = detail.status {
                    write!(f, " (status={})", status)?;
                }
                Ok(())
            }
            None => write!(f, "<opaque error>"),
        }
    }
}

impl std::error::Error for RawError {}

impl From<anyhow::Error> for RawError {
    fn from(value: anyhow::Error) -> Self {
        Self::thrown(format!("{:#}", value))
    }
}

/// JSONの値を、分類前のエラーに変換する。
///
/// `message`、`code`、`status`フィールドのいずれかを持つオブジェクトは`Shaped`、それ以外は
/// `Opaque`に変換する。
impl From<serde_json::Value> for RawError {
    fn from(value: serde_json::Value) -> Self {
        let object = match value.as_object() {
            Some(object) => object,
            None => return Self::Opaque,
        };
        let message = object
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from);
        let code = match object.get("code") {
            Some(serde_json::Value::Number(n)) => n.as_i64().map(ErrorCode::Numeric),
            Some(serde_json::Value::String(s)) => Some(ErrorCode::Text(s.clone())),
            _ => None,
        };
        let status = object
            .get("status")
            .and_then(|s| s.as_u64())
            .and_then(|s| u16::try_from(s).ok());
        if message.is_none() && code.is_none() && status.is_none() {
            return Self::Opaque;
        }

        Self::Shaped(ErrorDetail {
            message,
            code,
            status,
        })
    }
}

/// エラーの分類結果
///
/// 分類器が同期的に構築し、構築後は変更しない。
/// `message`はユーザーに表示するメッセージで、`original`はログにのみ記録する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    /// エラー分類
    pub kind: ErrorKind,
    /// ユーザーに表示するメッセージ
    pub message: String,
    /// 元のエラーを記録するべきか
    pub should_log: bool,
    /// 操作を再試行しても安全か
    pub should_retry: bool,
    /// 元のエラー
    pub original: RawError,
}
