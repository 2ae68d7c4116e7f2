//! # 载体图像模块
//!
//! 负责隐写核心与图像文件之间的边界：把图像字节解码为 RGBA 像素缓冲区，
//! 把修改后的缓冲区重新编码为 PNG，并串联完整的编码/解码流程。
//!
//! 输出必须使用无损格式。任何有损的重新编码 (如 JPEG) 都会破坏最低有效位中的数据，
//! 因此编码结果始终为 PNG。

use std::io::Cursor;

use image::{ImageFormat, ImageReader, RgbaImage};
use log::debug;

use crate::capacity::max_message_bytes;
use crate::cipher;
use crate::constants::MAX_FILE_SIZE;
use crate::error::{Result, StegoError};
use crate::progress::Progress;
use crate::steganography;

/// 载体图像的尺寸与容量信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierInfo {
    pub width: u32,
    pub height: u32,
    /// 可携带的密文令牌最大字节数。
    pub max_message_bytes: usize,
}

/// 解码结果。
///
/// 解密成功但文本为空或只包含空白时返回 [`Decoded::Empty`]，
/// 调用者应将其视为解码失败，但可以给出不同于硬错误的提示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Message(String),
    Empty,
}

fn check_file_size(bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(StegoError::image(format!(
            "image file is {} bytes, the limit is {} bytes",
            bytes.len(),
            MAX_FILE_SIZE
        )));
    }
    Ok(())
}

/// 读取图像尺寸并计算容量，不解码像素数据。
pub fn probe(bytes: &[u8]) -> Result<CarrierInfo> {
    check_file_size(bytes)?;
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StegoError::image(format!("failed to read image: {e}")))?
        .into_dimensions()
        .map_err(|e| StegoError::image(format!("failed to read image dimensions: {e}")))?;

    Ok(CarrierInfo {
        width,
        height,
        max_message_bytes: max_message_bytes(width, height),
    })
}

/// 将图像字节解码为 RGBA8 像素缓冲区 (行优先，每像素 4 字节)。
pub fn load_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    check_file_size(bytes)?;
    if let Ok(format) = image::guess_format(bytes) {
        debug!("carrier format: {format:?}");
    }

    let rgba = image::load_from_memory(bytes)
        .map_err(|e| StegoError::image(format!("failed to load image: {e}")))?
        .to_rgba8();

    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(StegoError::image("image has no pixels"));
    }
    Ok(rgba)
}

/// 将 RGBA8 像素缓冲区编码为 PNG 字节流。
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| StegoError::image(format!("failed to encode PNG: {e}")))?;
    Ok(out.into_inner())
}

fn require_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(StegoError::InvalidInput("secret key must not be empty".into()));
    }
    Ok(())
}

/// 加密消息并隐藏到图像中，返回 PNG 编码的结果图像。
///
/// 比特循环中的进度最多报告到 99，PNG 编码完成后报告 100。
///
/// # Errors
///
/// * 消息或口令为空 (或只含空白) 时返回 [`StegoError::InvalidInput`]。
/// * 消息字节数超过 [`max_message_bytes`] 时返回 [`StegoError::MessageTooLong`]。
/// * 加密后的令牌超出图像容量时返回 [`StegoError::Capacity`]。
/// * 图像无法解码或编码时返回 [`StegoError::Image`]。
pub fn encode_message<P>(
    image_bytes: &[u8],
    message: &str,
    key: &str,
    progress: &mut P,
) -> Result<Vec<u8>>
where
    P: Progress + ?Sized,
{
    if message.trim().is_empty() {
        return Err(StegoError::InvalidInput("message must not be empty".into()));
    }
    require_key(key)?;

    let mut image = load_rgba(image_bytes)?;
    let (width, height) = image.dimensions();
    let max = max_message_bytes(width, height);
    if message.len() > max {
        return Err(StegoError::MessageTooLong {
            length: message.len(),
            max,
        });
    }

    let token = cipher::seal(message, key)?;
    debug!(
        "embedding {} token bytes into {width}x{height} image (capacity {max} bytes)",
        token.len()
    );

    let mut capped = |p: u8| progress.report(p.min(99));
    steganography::embed(&mut image, &token, &mut capped)?;

    let png = encode_png(&image)?;
    progress.report(100);
    Ok(png)
}

/// 从图像中提取并解密隐藏的消息。
///
/// # Errors
///
/// * 口令为空时返回 [`StegoError::InvalidInput`]。
/// * 图像中没有有效的长度头部时返回 [`StegoError::Format`]。
/// * 口令错误或数据损坏时返回 [`StegoError::Crypto`]。
pub fn decode_message<P>(image_bytes: &[u8], key: &str, progress: &mut P) -> Result<Decoded>
where
    P: Progress + ?Sized,
{
    require_key(key)?;

    let image = load_rgba(image_bytes)?;
    let mut capped = |p: u8| progress.report(p.min(99));
    let token = steganography::extract(&image, &mut capped)?;
    debug!("extracted {} token bytes", token.len());

    let message = cipher::open(&token, key)?;
    progress.report(100);

    if message.trim().is_empty() {
        Ok(Decoded::Empty)
    } else {
        Ok(Decoded::Message(message))
    }
}
