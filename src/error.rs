//! # 错误类型模块
//!
//! 定义隐写核心 (密码、比特编解码、载体图像) 共用的错误类型。
//! 所有错误都是可恢复的，由调用者决定如何向用户报告。

use thiserror::Error;

/// 隐写编码或解码过程中可能出现的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 图像中没有有效的长度头部，或可用数据少于头部声明的长度。
    #[error("Format error: {0}")]
    Format(String),

    /// 加密后的消息超出了图像的可用容量。
    #[error("Not enough space in the image: required {required} bits, available {available} bits")]
    Capacity { required: usize, available: usize },

    /// 加密失败，或密钥错误、令牌损坏、解密结果不是有效文本。
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// 明文消息超过了图像容量 (加密前的预检查)。
    #[error("Message too long: {length} bytes, maximum for this image is {max} bytes")]
    MessageTooLong { length: usize, max: usize },

    /// 载体图像无法读取、解码或重新编码。
    #[error("Image error: {0}")]
    Image(String),

    /// 调用者提供的输入无效 (如空消息或空口令)。
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 操作被调用者取消。
    #[error("Operation cancelled")]
    Cancelled,
}

impl StegoError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    pub(crate) fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }
}

pub type Result<T, E = StegoError> = std::result::Result<T, E>;
