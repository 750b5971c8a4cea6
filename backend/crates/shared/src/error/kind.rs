//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// エラー種別の列挙体
///
/// HTTP ステータスコードに対応するエラー分類を定義します。
/// 各バリアントは RFC 7231/9110 に準拠したステータスコードにマッピングされます。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.status_code(), 404);
/// assert_eq!(kind.as_str(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - Bad Request: リクエストが不正
    BadRequest,
    /// 401 - Unauthorized: 認証が必要
    Unauthorized,
    /// 403 - Forbidden: アクセス権限なし
    Forbidden,
    /// 404 - Not Found: リソースが見つからない
    NotFound,
    /// 409 - Conflict: 現在の状態と競合
    Conflict,
    /// 429 - Too Many Requests: レート制限超過
    TooManyRequests,
    /// 500 - Internal Server Error: サーバー内部エラー
    InternalServerError,
    /// 503 - Service Unavailable: サービス利用不可（決済ゲートウェイ障害など）
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::BadRequest.status_code(), 400);
    /// assert_eq!(ErrorKind::Conflict.status_code(), 409);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// ユーザー向けの文字列表現を取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::ServiceUnavailable.as_str(), "Service Unavailable");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// サーバー側のエラーかどうかを判定
    ///
    /// 5xx系のエラーは `true` を返します。
    /// これらのエラーはログに記録すべきです。
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// クライアント側のエラーかどうかを判定
    ///
    /// 4xx系のエラーは `true` を返します。
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
