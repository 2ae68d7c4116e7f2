//! # lsb_cipher 库
//!
//! 本库包含加密 LSB 隐写工具的核心逻辑：
//!
//! * [`cipher`] 将明文和口令转换为文本安全的密文令牌。
//! * [`steganography`] 把令牌写入或读出 RGBA 像素的最低有效位。
//! * [`capacity`] 根据图像尺寸计算可携带的令牌长度。
//! * [`carrier`] 负责图像解码、PNG 编码以及完整的编码/解码流程。

// 声明库包含的所有模块。

pub mod capacity;
pub mod carrier;
pub mod cipher;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod progress;
pub mod steganography;

pub use error::{Result, StegoError};
