use image::{ImageBuffer, Rgba, RgbaImage};
use lsb_cipher::{
    capacity::max_message_bytes,
    carrier::{self, Decoded},
    cipher,
    cli::{CapacityArgs, HideArgs, RecoverArgs},
    handler::{handle_capacity, handle_hide, handle_recover},
    progress::silent,
    steganography,
};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], 255]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

fn hide_args(image: &Path, text: &Path, dest: Option<&Path>, key: &str, force: bool) -> HideArgs {
    HideArgs {
        image: image.to_path_buf(),
        text: Some(text.to_path_buf()),
        message: None,
        key: key.to_string(),
        dest: dest.map(Path::to_path_buf),
        force,
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let source_text_path = dir.path().join("source.txt");
    let recovered_text_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide
    handle_hide(hide_args(
        &original_image_path,
        &source_text_path,
        Some(&hidden_image_path),
        "correct horse",
        false,
    ))?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    let recover_args = RecoverArgs {
        image: hidden_image_path.clone(),
        key: "correct horse".to_string(),
        text: Some(recovered_text_path.clone()),
        force: false,
    };
    handle_recover(recover_args)?;
    assert!(
        recovered_text_path.exists(),
        "Recovered text file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_text_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "Testing default path generation. 测试默认路径生成。";

    // 2. 测试 handle_hide，不提供 dest 路径，文本直接从命令行给出
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        text: None,
        message: Some(original_text.to_string()),
        key: "k".to_string(),
        dest: None, // 关键：测试 None 的情况
        force: false,
    };
    handle_hide(hide_args)?;

    // 验证默认的隐藏图像文件是否已创建
    let expected_hidden_path = dir.path().join("doctored_original.png");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    // 3. 测试 handle_recover，不提供 text 输出路径
    let recover_args = RecoverArgs {
        image: expected_hidden_path, // 使用上一步生成的默认文件
        key: "k".to_string(),
        text: None, // 关键：测试 None 的情况
        force: false,
    };
    handle_recover(recover_args)?;

    // 验证默认的恢复文本文件是否已创建
    let expected_recovered_path = dir.path().join("recovered_doctored_original.txt");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered text file should be created at: {:?}",
        expected_recovered_path
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&expected_recovered_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text from default file must match the original."
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50);
    fs::write(&text_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    // 执行并断言操作会失败
    let result = handle_hide(hide_args(&image_path, &text_path, Some(&dest_path), "k", false));
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let result = handle_hide(hide_args(&image_path, &text_path, Some(&dest_path), "k", true));
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let text_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.png");

    // 创建一个非常小的图片
    create_test_image(&image_path, 10, 10);
    // 创建一个非常大的文本
    let large_text = "a".repeat(5000);
    fs::write(&text_path, large_text)?;

    // 2. 执行并断言错误
    let result = handle_hide(hide_args(&image_path, &text_path, Some(&dest_path), "k", false));

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Not enough space"));
    }
    assert!(!dest_path.exists());

    Ok(())
}

/// 验证加密后的令牌超出容量时 (明文本身能放下) 同样被拒绝
#[test]
fn test_handle_hide_sealed_token_too_large() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("tiny.png");
    let text_path = dir.path().join("hi.txt");

    create_test_image(&image_path, 10, 10);
    fs::write(&text_path, "hi")?;

    let result = handle_hide(hide_args(&image_path, &text_path, None, "k1", false));
    let err = result.expect_err("a 64-byte token cannot fit in 25 bytes");
    assert!(err.to_string().contains("encrypted text"));

    Ok(())
}

/// 验证错误口令无法恢复文本
#[test]
fn test_recover_with_wrong_key_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let text_path = dir.path().join("secret.txt");
    let hidden_path = dir.path().join("hidden.png");
    let out_path = dir.path().join("out.txt");

    create_test_image(&image_path, 64, 64);
    fs::write(&text_path, "hello")?;
    handle_hide(hide_args(&image_path, &text_path, Some(&hidden_path), "secret1", false))?;

    let result = handle_recover(RecoverArgs {
        image: hidden_path,
        key: "secret2".to_string(),
        text: Some(out_path.clone()),
        force: false,
    });

    let err = result.expect_err("wrong key must not recover the text");
    assert!(format!("{err:#}").contains("key is incorrect"));
    assert!(!out_path.exists());

    Ok(())
}

/// 验证没有隐藏消息的图像会被识别出来
#[test]
fn test_recover_from_clean_image_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("clean.png");
    RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255])).save(&image_path)?;

    let result = handle_recover(RecoverArgs {
        image: image_path,
        key: "k".to_string(),
        text: None,
        force: false,
    });

    let err = result.expect_err("clean image carries no message");
    assert!(format!("{err:#}").contains("may not contain a hidden message"));

    Ok(())
}

/// 验证 BMP 载体也能使用，输出始终为 PNG
#[test]
fn test_bmp_carrier_produces_png() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("carrier.bmp");
    let text_path = dir.path().join("msg.txt");

    create_test_image(&image_path, 60, 40);
    fs::write(&text_path, "bitmap carrier")?;
    handle_hide(hide_args(&image_path, &text_path, None, "k", false))?;

    let hidden_path = dir.path().join("doctored_carrier.png");
    let bytes = fs::read(&hidden_path)?;
    assert_eq!(image::guess_format(&bytes)?, image::ImageFormat::Png);

    let decoded = carrier::decode_message(&bytes, "k", &mut silent())?;
    assert_eq!(decoded, Decoded::Message("bitmap carrier".to_string()));

    Ok(())
}

/// 验证 capacity 命令能正常运行
#[test]
fn test_handle_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cap.png");
    create_test_image(&image_path, 10, 10);

    handle_capacity(CapacityArgs {
        image: image_path.clone(),
    })?;

    let info = carrier::probe(&fs::read(&image_path)?)?;
    assert_eq!(info.max_message_bytes, max_message_bytes(10, 10));
    assert_eq!(info.max_message_bytes, 25);

    Ok(())
}

/// 验证核心流程：密码 → 嵌入 → 提取 → 解密，且 Alpha 通道保持不变
#[test]
fn test_core_roundtrip_preserves_alpha() -> anyhow::Result<()> {
    let mut pixels = vec![0u8; 80 * 80 * 4];
    rand::rng().fill_bytes(&mut pixels);
    let original = pixels.clone();

    let token = cipher::seal("核心流程 round trip", "key")?;
    assert!(token.len() <= max_message_bytes(80, 80));
    steganography::embed(&mut pixels, &token, &mut silent())?;

    assert_eq!(
        steganography::read_length_header(&pixels)? as usize,
        token.len()
    );
    assert!(
        original
            .chunks_exact(4)
            .zip(pixels.chunks_exact(4))
            .all(|(a, b)| a[3] == b[3])
    );

    let extracted = steganography::extract(&pixels, &mut silent())?;
    assert_eq!(cipher::open(&extracted, "key")?, "核心流程 round trip");

    Ok(())
}

/// 验证所有恢复失败的提示都包含图像路径
#[test]
fn test_recover_error_names_the_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("named.png");
    create_test_image(&image_path, 20, 20);

    let result = handle_recover(RecoverArgs {
        image: image_path.clone(),
        key: "   ".to_string(),
        text: None,
        force: false,
    });

    let message = format!("{:#}", result.expect_err("blank key must be rejected"));
    assert!(message.contains("named.png"));
    assert!(message.contains("Invalid input"));

    Ok(())
}
