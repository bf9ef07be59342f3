// パスワードハッシュ化と検証（bcrypt実装）

use crate::common::error::FlowError;
use bcrypt::{hash, verify};

/// パスワードをbcryptでハッシュ化
///
/// # Arguments
/// * `password` - ハッシュ化するパスワード
/// * `cost` - bcryptコスト（本番12、テスト4）
///
/// # Returns
/// * `Ok(String)` - bcryptハッシュ文字列（$2b$で始まる）
/// * `Err(FlowError)` - ハッシュ化失敗
pub fn hash_password(password: &str, cost: u32) -> Result<String, FlowError> {
    hash(password, cost)
        .map_err(|e| FlowError::PasswordHash(format!("Failed to hash password: {}", e)))
}

/// パスワードを検証
///
/// # Returns
/// * `Ok(true)` - パスワード一致
/// * `Ok(false)` - パスワード不一致
/// * `Err(FlowError)` - 検証失敗（不正なハッシュ文字列など）
pub fn verify_password(password: &str, hash: &str) -> Result<bool, FlowError> {
    verify(password, hash)
        .map_err(|e| FlowError::PasswordHash(format!("Failed to verify password: {}", e)))
}
