//! # 比特编解码模块
//!
//! 在 RGBA 像素缓冲区中写入或读取嵌入流：32 位大端长度头部，后接令牌的每个字节
//! (最高位在前)。每个比特写入一个通道字节的最低有效位，通道按 R、G、B 循环，
//! Alpha 通道永远跳过。

use crate::capacity::{available_bits, required_bits};
use crate::cipher::Token;
use crate::constants::{BYTES_PER_PIXEL, CHANNELS_PER_PIXEL, HEADER_BITS, MAX_TOKEN_LEN};
use crate::error::{Result, StegoError};
use crate::progress::{CancelToken, Progress, Ticker, is_checkpoint};

/// 第 `bit` 个嵌入比特对应的缓冲区偏移。
fn slot_offset(bit: usize) -> usize {
    (bit / CHANNELS_PER_PIXEL) * BYTES_PER_PIXEL + bit % CHANNELS_PER_PIXEL
}

fn validate_buffer(pix: &[u8]) -> Result<()> {
    if pix.is_empty() || pix.len() % BYTES_PER_PIXEL != 0 {
        return Err(StegoError::format(format!(
            "pixel buffer length {} is not a non-zero multiple of {}",
            pix.len(),
            BYTES_PER_PIXEL
        )));
    }
    Ok(())
}

/// 嵌入流的比特序列：长度头部在前，令牌字节在后，均为最高位在前。
fn stream_bits(token: &[u8]) -> impl Iterator<Item = u8> + '_ {
    let header = (token.len() as u32).to_be_bytes();
    header
        .into_iter()
        .chain(token.iter().copied())
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
}

/// 将令牌嵌入像素缓冲区。
///
/// 操作是原子的：容量不足时缓冲区保持不变。
///
/// # Errors
///
/// * 缓冲区长度不是 4 的非零倍数时返回 [`StegoError::Format`]。
/// * 令牌为空时返回 [`StegoError::InvalidInput`]。
/// * 令牌超过 1,000,000 字节或超出图像容量时返回 [`StegoError::Capacity`]。
pub fn embed<P>(pix: &mut [u8], token: &Token, progress: &mut P) -> Result<()>
where
    P: Progress + ?Sized,
{
    embed_with_cancel(pix, token, progress, &CancelToken::new())
}

/// 与 [`embed`] 相同，但会在头部和载荷之间以及载荷中周期性检查取消标志。
///
/// 被取消时，已写入的区域会被还原，缓冲区与调用前完全一致。
pub fn embed_with_cancel<P>(
    pix: &mut [u8],
    token: &Token,
    progress: &mut P,
    cancel: &CancelToken,
) -> Result<()>
where
    P: Progress + ?Sized,
{
    validate_buffer(pix)?;
    // 长度为 0 的头部会被 extract 视为没有消息
    if token.is_empty() {
        return Err(StegoError::InvalidInput(
            "cannot embed an empty token".into(),
        ));
    }

    let required = required_bits(token.len());
    let available = available_bits(pix.len());
    if token.len() > MAX_TOKEN_LEN || required > available {
        return Err(StegoError::Capacity {
            required,
            available,
        });
    }
    cancel.check()?;

    let end = slot_offset(required - 1) + 1;
    let snapshot = pix[..end].to_vec();

    let result = write_stream(pix, token, required, progress, cancel);
    if result.is_err() {
        pix[..end].copy_from_slice(&snapshot);
    }
    result
}

fn write_stream<P>(
    pix: &mut [u8],
    token: &Token,
    total: usize,
    progress: &mut P,
    cancel: &CancelToken,
) -> Result<()>
where
    P: Progress + ?Sized,
{
    let mut ticker = Ticker::new(progress, total);

    for (i, bit) in stream_bits(token.as_bytes()).enumerate() {
        if i >= HEADER_BITS && is_checkpoint(i - HEADER_BITS) {
            cancel.check()?;
        }
        ticker.tick(i);

        let offset = slot_offset(i);
        pix[offset] = (pix[offset] & 0xFE) | bit;
    }

    ticker.finish();
    Ok(())
}

/// 读取前 32 个嵌入比特，返回未经校验的长度头部。
///
/// # Errors
///
/// 缓冲区格式无效或不足以容纳头部时返回 [`StegoError::Format`]。
pub fn read_length_header(pix: &[u8]) -> Result<u32> {
    validate_buffer(pix)?;
    if available_bits(pix.len()) < HEADER_BITS {
        return Err(StegoError::format(
            "image is too small to contain a message header",
        ));
    }

    Ok((0..HEADER_BITS).fold(0u32, |acc, i| {
        (acc << 1) | u32::from(pix[slot_offset(i)] & 1)
    }))
}

/// 从像素缓冲区中提取令牌。
///
/// # Errors
///
/// 以下情况返回 [`StegoError::Format`]：
/// * 长度头部为 0 或超过 1,000,000 (图像未携带消息或使用了其他格式)。
/// * 头部声明的长度超出缓冲区实际可读的比特数。
pub fn extract<P>(pix: &[u8], progress: &mut P) -> Result<Token>
where
    P: Progress + ?Sized,
{
    extract_with_cancel(pix, progress, &CancelToken::new())
}

/// 与 [`extract`] 相同，但会在头部和载荷之间以及载荷中周期性检查取消标志。
pub fn extract_with_cancel<P>(pix: &[u8], progress: &mut P, cancel: &CancelToken) -> Result<Token>
where
    P: Progress + ?Sized,
{
    let len = read_length_header(pix)? as usize;
    if len == 0 || len > MAX_TOKEN_LEN {
        return Err(StegoError::format("no valid message header found"));
    }

    let available = available_bits(pix.len());
    if required_bits(len) > available {
        return Err(StegoError::format(format!(
            "header declares {len} bytes but the image only holds {} more bits",
            available - HEADER_BITS
        )));
    }
    cancel.check()?;

    let total = len * 8;
    let mut ticker = Ticker::new(progress, total);
    let mut bytes = Vec::with_capacity(len);
    let mut current = 0u8;

    for k in 0..total {
        if is_checkpoint(k) {
            cancel.check()?;
        }
        ticker.tick(k);

        current = (current << 1) | (pix[slot_offset(HEADER_BITS + k)] & 1);
        if k % 8 == 7 {
            bytes.push(current);
            current = 0;
        }
    }

    ticker.finish();
    Ok(Token::from_bytes(bytes))
}
