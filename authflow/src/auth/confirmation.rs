// メールアドレス確認トークン
//
// トークンは1人のユーザーIDに紐付いた署名付き・期限付きのJWT。
// 確認済みフラグの更新は`confirmed = 0`条件付きで行うため、遷移は一度だけ起こる。

use super::{expiration_after, sign_claims, verify_claims};
use crate::common::auth::{ConfirmationClaims, User};
use crate::common::error::FlowError;
use sqlx::SqlitePool;
use uuid::Uuid;

/// 確認トークンの検証結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// 今回の呼び出しで確認済みになった
    Confirmed,
    /// すでに確認済みだった（何も変更しない）
    AlreadyConfirmed,
    /// 署名不正、期限切れ、または別ユーザーのトークン
    Invalid,
}

/// 確認トークンを生成
///
/// # Arguments
/// * `user_id` - トークンを紐付けるユーザーID
/// * `secret` - 署名鍵
/// * `ttl_secs` - 有効期間（秒）
pub fn generate_confirmation_token(
    user_id: Uuid,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, FlowError> {
    let claims = ConfirmationClaims {
        confirm: user_id.to_string(),
        exp: expiration_after(ttl_secs)?,
    };
    sign_claims(&claims, secret)
}

/// 確認トークンを検証し、紐付いたユーザーIDを返す
pub fn verify_confirmation_token(token: &str, secret: &str) -> Result<Uuid, FlowError> {
    let claims = verify_claims::<ConfirmationClaims>(token, secret)?;
    claims
        .confirm
        .parse::<Uuid>()
        .map_err(|e| FlowError::Token(format!("Invalid confirmation subject: {}", e)))
}

/// トークンを使ってユーザーを確認済みにする
///
/// トークンが`user`本人のものでなければ`Invalid`。DBエラーのみ`Err`を返す。
pub async fn confirm_user(
    pool: &SqlitePool,
    user: &User,
    token: &str,
    secret: &str,
) -> Result<ConfirmOutcome, FlowError> {
    if user.confirmed {
        return Ok(ConfirmOutcome::AlreadyConfirmed);
    }

    let owner = match verify_confirmation_token(token, secret) {
        Ok(owner) => owner,
        Err(e) => {
            tracing::info!("Rejected confirmation token for {}: {}", user.id, e);
            return Ok(ConfirmOutcome::Invalid);
        }
    };
    if owner != user.id {
        tracing::warn!(
            "Confirmation token for {} presented by {}",
            owner,
            user.id
        );
        return Ok(ConfirmOutcome::Invalid);
    }

    if crate::db::users::mark_confirmed(pool, user.id).await? {
        Ok(ConfirmOutcome::Confirmed)
    } else {
        Ok(ConfirmOutcome::AlreadyConfirmed)
    }
}
