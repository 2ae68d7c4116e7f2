//! # 容量计算模块
//!
//! 根据图像尺寸计算可隐藏的密文字节数，以及像素缓冲区的原始比特预算。

use crate::constants::{BYTES_PER_PIXEL, CHANNELS_PER_PIXEL, HEADER_BITS, RESERVED_PIXELS};

/// 计算 `width × height` 的图像最多能携带多少字节的密文令牌。
///
/// 公式为 `floor((width * height - 32) * 3 / 8)`，结果为负时取 0。
/// 预留的 32 个单位是像素而不是比特，与既有的容量计算保持一致。
pub fn max_message_bytes(width: u32, height: u32) -> usize {
    let pixels = (width as usize).saturating_mul(height as usize);
    pixels
        .saturating_sub(RESERVED_PIXELS)
        .saturating_mul(CHANNELS_PER_PIXEL)
        / 8
}

/// 长度为 `buffer_len` 的 RGBA 缓冲区中可写入的比特数 (每个像素 3 个)。
pub fn available_bits(buffer_len: usize) -> usize {
    (buffer_len / BYTES_PER_PIXEL) * CHANNELS_PER_PIXEL
}

/// 嵌入一个长度为 `token_len` 字节的令牌所需的比特数 (含长度头部)。
pub fn required_bits(token_len: usize) -> usize {
    HEADER_BITS.saturating_add(token_len.saturating_mul(8))
}
