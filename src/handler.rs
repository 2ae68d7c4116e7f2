//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用隐写核心以及向用户报告结果。

use crate::carrier::{self, Decoded};
use crate::cipher;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::error::StegoError;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::{info, trace};
use std::fs;
use std::path::{Path, PathBuf};

/// 在输入文件旁生成默认输出路径：`<prefix><文件名主干>.<extension>`。
fn default_output(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 输出文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Output file already exists: {}. \nUse {} to overwrite it.",
            path.to_string_lossy().red().bold(),
            "--force".yellow()
        );
    }
    Ok(())
}

fn log_progress(percent: u8) {
    trace!("progress: {percent}%");
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本、加密文本、检查隐写空间是否足够、调用隐写核心函数嵌入密文，
/// 最后将结果以 PNG 格式写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和口令的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或文本文件。
/// * 文本或口令为空。
/// * 图像文件没有足够的空间来隐藏加密后的文本。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_output(&args.image, "doctored_", "png"));
    ensure_writable(&dest, args.force)?;

    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let text = match (&args.text, &args.message) {
        (Some(path), _) => fs::read_to_string(path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, Some(message)) => message.clone(),
        (None, None) => bail!("No text to hide. Provide either --text or --message."),
    };

    info!(
        "hiding {} bytes of text in {}",
        text.len(),
        args.image.display()
    );

    let encoded = match carrier::encode_message(&picture, &text, &args.key, &mut log_progress) {
        Ok(encoded) => encoded,
        Err(StegoError::MessageTooLong { length, max }) => bail!(
            "Not enough space in the image to hide the text. \nText: {} bytes, Maximum: {} bytes",
            length.to_string().red().bold(),
            max.to_string().green().bold()
        ),
        Err(StegoError::Capacity {
            required,
            available,
        }) => bail!(
            "Not enough space in the image to hide the encrypted text. \nRequired: {} bits, Available: {} bits",
            required.to_string().red().bold(),
            available.to_string().green().bold()
        ),
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to hide the text in {}",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
    };

    fs::write(&dest, encoded).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully encrypted, hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、提取并解密隐藏的文本，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和口令的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中没有有效的隐藏消息。
/// * 口令错误或数据损坏，或解密结果为空。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_output(&args.image, "recovered_", "txt"));
    ensure_writable(&dest, args.force)?;

    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    info!("recovering text from {}", args.image.display());

    let text = match carrier::decode_message(&picture, &args.key, &mut log_progress) {
        Ok(Decoded::Message(text)) => text,
        Ok(Decoded::Empty) => bail!(
            "Decryption succeeded but no readable message was found in '{}'. \nThe key may be wrong or the hidden message is empty.",
            args.image.to_string_lossy().red().bold()
        ),
        Err(e @ StegoError::Format(_)) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to recover the message from '{}'. \nThe image may not contain a hidden message or is corrupted.",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
        Err(e @ StegoError::Crypto(_)) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to decrypt the message from '{}'. \nThe key is incorrect or the data is corrupted.",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to recover the message from '{}'.",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
    };

    fs::write(&dest, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 说明密文容量与明文长度的关系：空消息加密后已有 60 字节。
fn capacity_note(capacity: usize) -> String {
    let minimum = cipher::sealed_len(0);
    if capacity < minimum {
        format!(
            "Encrypted text is at least {minimum} bytes, so this image cannot hold any message."
        )
    } else {
        let max_plaintext = (0..=capacity)
            .take_while(|&n| cipher::sealed_len(n) <= capacity)
            .last()
            .unwrap_or(0);
        format!(
            "Encrypted text is at least {minimum} bytes; the longest message that fits is {max_plaintext} bytes."
        )
    }
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 读取图像尺寸并输出可携带的最大密文字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let info = carrier::probe(&picture).with_context(|| {
        format!(
            "Unable to inspect image: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{}: {}x{} pixels, capacity {} bytes of encrypted text",
        args.image.to_string_lossy().bold(),
        info.width,
        info.height,
        info.max_message_bytes.to_string().green().bold()
    );
    println!("{}", capacity_note(info.max_message_bytes));
    Ok(())
}
