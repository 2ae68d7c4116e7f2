//! # 密码模块
//!
//! 将明文消息和口令转换为可嵌入图像的密文令牌，以及其逆过程。
//!
//! - 密钥派生：Argon2id (默认参数)，每个令牌使用新的 16 字节随机盐
//! - 加密：AES-256-GCM-SIV，每个令牌使用新的 12 字节随机数
//!
//! 令牌格式：`base64(salt || nonce || ciphertext || tag)`。
//! 令牌只包含可打印 ASCII 字符，每个字符恰好对应一个嵌入字节。

use std::fmt;

use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use argon2::Argon2;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::constants::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{Result, StegoError};

/// 经过加密和文本编码的消息，即实际嵌入图像的字节序列。
///
/// 从图像中提取出的令牌可能是任意字节，[`open`] 负责验证。
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Vec<u8>);

impl Token {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// 不输出令牌内容
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token").field("len", &self.0.len()).finish()
    }
}

/// 长度为 `plaintext_len` 字节的明文加密后得到的令牌长度。
pub fn sealed_len(plaintext_len: usize) -> usize {
    (SALT_LEN + NONCE_LEN + TAG_LEN + plaintext_len).div_ceil(3) * 4
}

/// 由口令和盐派生 256 位 AES 密钥。
fn derive_key(key: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let mut derived = Zeroizing::new([0u8; 32]);
    Argon2::default()
        .hash_password_into(key.as_bytes(), salt, &mut *derived)
        .map_err(|e| StegoError::crypto(format!("key derivation failed: {e}")))?;
    Ok(derived)
}

fn cipher_for(key: &str, salt: &[u8]) -> Result<Aes256GcmSiv> {
    let derived = derive_key(key, salt)?;
    Aes256GcmSiv::new_from_slice(&*derived)
        .map_err(|e| StegoError::crypto(format!("invalid key length: {e}")))
}

/// 使用口令加密明文，返回文本安全的令牌。
///
/// 每次调用都使用新的随机盐和随机数，因此相同输入会得到不同的令牌。
/// 空明文和空口令是允许的，调用者负责在此之前做输入校验。
///
/// # Errors
///
/// 仅在密钥派生或加密内部失败时返回 [`StegoError::Crypto`]。
pub fn seal(plaintext: &str, key: &str) -> Result<Token> {
    let mut rng = rand::rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    let cipher = cipher_for(key, &salt)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| StegoError::crypto(format!("encryption failed: {e}")))?;

    let mut raw = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&nonce);
    raw.extend_from_slice(&ciphertext);

    Ok(Token(BASE64.encode(raw).into_bytes()))
}

/// 使用口令解密令牌，返回原始明文。
///
/// 对任意输入都不会 panic，只会返回错误。
///
/// # Errors
///
/// 以下情况返回 [`StegoError::Crypto`]：
/// * 令牌不是有效的 base64 或长度不足以包含盐、随机数和认证标签。
/// * 口令错误或令牌被篡改 (认证失败)。
/// * 解密结果不是有效的 UTF-8 文本。
pub fn open(token: &Token, key: &str) -> Result<String> {
    let raw = BASE64
        .decode(token.as_bytes())
        .map_err(|e| StegoError::crypto(format!("token is not valid base64: {e}")))?;

    if raw.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
        return Err(StegoError::crypto(format!(
            "token too short: {} bytes",
            raw.len()
        )));
    }

    let (salt, rest) = raw.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let cipher = cipher_for(key, salt)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            StegoError::crypto("failed to decrypt message, incorrect key or corrupted data")
        })?;

    String::from_utf8(plaintext)
        .map_err(|_| StegoError::crypto("decrypted message is not valid UTF-8 text"))
}
