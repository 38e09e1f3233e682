use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Level, subscriber::DefaultGuard};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::{Layer, fmt, registry};

/// 日志上下文
///
/// 持有期间日志同时输出到控制台与日志文件, 调用 [`LogContext::finish`] 后刷新并释放
pub struct LogContext {
    log_file: PathBuf,
    writer: Arc<File>,
    _guard: DefaultGuard,
}

impl LogContext {
    /// 初始化日志记录器, 日志文件名为 `<YYYYMMDD_HHMMSS>.log`
    ///
    /// # 参数
    ///
    /// * `out_dir` - 日志文件所在目录
    /// * `log_level` - 日志等级
    pub fn init(out_dir: &Path, log_level: Level) -> Result<Self> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("创建目录 {} 失败", out_dir.display()))?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = out_dir.join(format!("{}.log", timestamp));

        let filter = Targets::new()
            .with_default(LevelFilter::from_level(log_level))
            .with_target("ort", LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .with_ansi(true)
            .with_timer(fmt::time::ChronoLocal::new(
                "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            ))
            .with_filter(filter.clone());

        let writer = Arc::new(
            OpenOptions::new()
                .write(true)
                .append(true)
                .create(true)
                .open(&log_file)
                .with_context(|| format!("创建日志文件 {} 失败", log_file.display()))?,
        );
        let file_layer = fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_timer(fmt::time::ChronoLocal::new(
                "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            ))
            .with_filter(filter);

        let subscriber = registry().with(console_layer).with(file_layer);
        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            log_file,
            writer,
            _guard: guard,
        })
    }

    /// 日志文件路径
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// 刷新日志文件并卸载日志记录器
    pub fn finish(self) -> Result<()> {
        self.writer
            .sync_all()
            .with_context(|| format!("刷新日志文件 {} 失败", self.log_file.display()))
    }
}
