use super::Workbench;
use crate::kernel::Action as KernelAction;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

impl Workbench {
    /// 主循环每轮调用：收取后台消息并推进高亮防抖
    pub fn tick(&mut self) -> bool {
        let mut changed = self.poll_runtime();
        changed |= self.dispatch_kernel(KernelAction::HighlightTick {
            now: Instant::now(),
        });
        changed
    }

    /// 事件等待超时：不晚于下一次高亮时间点
    pub fn poll_timeout(&self, idle: Duration) -> Duration {
        match self.store.next_highlight_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(idle),
            None => idle,
        }
    }

    fn poll_runtime(&mut self) -> bool {
        let mut changed = false;
        let mut drained = 0usize;
        while drained < super::MAX_RUNTIME_DRAIN_PER_TICK {
            match self.runtime_rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    changed |= self.dispatch_kernel(msg.into());
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("runtime channel disconnected");
                    break;
                }
            }
        }
        changed
    }
}
