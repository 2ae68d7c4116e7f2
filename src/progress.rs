//! # 进度与取消模块
//!
//! 比特循环通过 [`Progress`] 向调用者同步报告完成百分比。
//! 报告仅供参考，接收方无法影响正在处理的缓冲区。
//! [`CancelToken`] 允许其他线程请求提前终止一次编码或解码。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::constants::PROGRESS_INTERVAL;
use crate::error::{Result, StegoError};

/// 接收进度百分比 (0..=100) 的目标。
///
/// 循环过程中报告的值单调不减且不超过 99，全部完成后恰好报告一次 100。
pub trait Progress {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> Progress for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// 丢弃所有进度报告。
pub fn silent() -> impl Progress {
    |_: u8| {}
}

/// 跨线程共享的取消标志。
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// 如果已请求取消，则返回 [`StegoError::Cancelled`]。
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(StegoError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// 比特循环内部使用的进度节拍器。
///
/// 在第 0 个比特以及此后每 [`PROGRESS_INTERVAL`] 个比特时报告一次。
pub(crate) struct Ticker<'a, P: Progress + ?Sized> {
    sink: &'a mut P,
    total: usize,
}

impl<'a, P: Progress + ?Sized> Ticker<'a, P> {
    pub(crate) fn new(sink: &'a mut P, total: usize) -> Self {
        Self { sink, total }
    }

    pub(crate) fn tick(&mut self, done: usize) {
        if is_checkpoint(done) {
            self.sink.report(percent(done, self.total));
        }
    }

    pub(crate) fn finish(self) {
        self.sink.report(100);
    }
}

/// 当前是否处于报告节点 (也是检查取消的节点)。
pub(crate) fn is_checkpoint(done: usize) -> bool {
    done % PROGRESS_INTERVAL == 0
}

/// `min(99, done * 100 / total)`。
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done as u128 * 100 / total as u128).min(99);
    pct as u8
}
