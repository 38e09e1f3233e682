use std::time::Instant;

use tracing::info;

/// 进度条
///
/// 仅输出进度日志, 不影响评估流程
pub struct ProgressBar {
    total: usize,
    completed: usize,
    start: Instant,
}

impl ProgressBar {
    /// 创建进度条
    ///
    /// # 参数
    ///
    /// * `total` - 任务总数
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            start: Instant::now(),
        }
    }

    /// 进度加一
    pub fn update(&mut self) {
        self.completed += 1;
        let percent = self.completed as f64 * 100.0 / self.total.max(1) as f64;
        info!(
            "[{}/{}] {:.1}%, 已耗时 {:.1}s",
            self.completed,
            self.total,
            percent,
            self.start.elapsed().as_secs_f64()
        );
    }

    /// 已完成数量
    pub fn completed(&self) -> usize {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update() {
        let mut progress = ProgressBar::new(3);
        assert_eq!(progress.completed(), 0);
        progress.update();
        progress.update();
        assert_eq!(progress.completed(), 2);
    }

    #[test]
    fn test_update_zero_total() {
        let mut progress = ProgressBar::new(0);
        progress.update();
        assert_eq!(progress.completed(), 1);
    }
}
