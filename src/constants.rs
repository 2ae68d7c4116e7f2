/// 长度头部占用的比特数。
/// 长度以 `u32` 大端序 (最高位在前) 写入，每个比特占用一个 R/G/B 通道。
pub const HEADER_BITS: usize = 32;

/// 允许嵌入或提取的密文令牌的最大字节数。
/// 超出此值的长度头部被视为无效 (图像未携带消息或格式不符)。
pub const MAX_TOKEN_LEN: usize = 1_000_000;

/// 每个像素在缓冲区中占用的字节数 (R, G, B, A)。
pub const BYTES_PER_PIXEL: usize = 4;

/// 每个像素可用于隐写的通道数。Alpha 通道永远不会被修改。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 容量计算时为长度头部预留的像素数。
///
/// 头部实际只占用 ⌈32 / 3⌉ = 11 个像素，但容量公式预留 32 个像素，
/// 以保证与既有图像的容量计算结果一致。
pub const RESERVED_PIXELS: usize = 32;

/// 每处理多少个比特报告一次进度。
pub const PROGRESS_INTERVAL: usize = 1000;

/// 载体图像文件的最大字节数 (25 MiB)。
pub const MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

/// Argon2 密钥派生使用的盐长度 (字节)。
pub const SALT_LEN: usize = 16;

/// AES-GCM-SIV 随机数长度 (字节)。
pub const NONCE_LEN: usize = 12;

/// AES-GCM-SIV 认证标签长度 (字节)。
pub const TAG_LEN: usize = 16;
