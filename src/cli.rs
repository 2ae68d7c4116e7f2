//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

/// 环境变量名，可以代替 `--key` 提供口令。
pub const KEY_ENV: &str = "LSB_CIPHER_KEY";

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，先用口令加密文本，再把密文隐藏在无损格式图像中。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，先用口令加密文本，再把密文隐藏在无损格式图像 (如 PNG, BMP) 中。\n输出图像始终为 PNG，任何有损的重新编码都会破坏隐藏的数据。"
)]
pub struct Cli {
    /// 输出更详细的日志 (-v 为 info，-vv 为 debug，-vvv 为 trace)。
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 加密文本并隐藏在无损格式图像 (如 PNG, BMP) 中。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复并解密隐藏的文本。
    Recover(RecoverArgs),

    /// 显示图像可携带的最大密文字节数。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["text", "message"])))]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 直接在命令行中给出要隐藏的文本。
    #[arg(short, long)]
    pub message: Option<String>,

    /// 加密口令。
    #[arg(short, long, env = KEY_ENV, hide_env_values = true)]
    pub key: String,

    /// 隐写完成后，保存结果图像的输出路径。默认为输入图像旁的 `doctored_<名称>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 解密口令。
    #[arg(short, long, env = KEY_ENV, hide_env_values = true)]
    pub key: String,

    /// 恢复文本后，保存文本内容的输出路径。默认为图像旁的 `recovered_<名称>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
