//! 在标签体数据归档上完整遍历所有缝隙, 报告各数据集的生成统计.

use std::error::Error;

mod result;
mod runner;

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;
    runner::run()?.analyze()?;
    Ok(())
}
