//! 生成结果.

use std::io::{self, Write};

use neurite_berry::sequencer::GenerationStats;

/// 将 `stats` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, volumes: usize, s: &GenerationStats, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn ratio_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{:.4}%", f * 100.0),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Split `{name}` ({volumes} volumes):")?;
    writeln!(w, "{S4}Gaps visited: {}", s.gaps)?;
    writeln!(w, "{S4}Batches: {}", s.batches)?;
    writeln!(w, "{S4}Batches without positives: {}", s.no_true)?;
    writeln!(w, "{S4}Batches with several positives: {}", s.multi_true)?;
    writeln!(w, "{S4}Candidates: {}", s.candidates)?;
    writeln!(w, "{S4}Rejected candidates: {}", s.rejected)?;
    writeln!(w, "{S4}Truncated candidates: {}", s.truncated)?;
    writeln!(w, "{S4}Examples: {}", s.total_examples)?;
    write!(w, "{S4}Positive ratio: {}", ratio_to_display(s.positive_ratio()))?;
    Ok(())
}

/// 各数据集的生成统计.
#[derive(Debug, Default)]
pub struct GenerationReport {
    data: Vec<(&'static str, usize, GenerationStats)>,
}

impl GenerationReport {
    /// 记录一个数据集的结果.
    pub fn push(&mut self, name: &'static str, volumes: usize, stats: GenerationStats) {
        self.data.push((name, volumes, stats));
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        utils::sep_to(&mut out)?;
        for (name, volumes, stats) in self.data.iter() {
            describe_into(name, *volumes, stats, &mut out)?;
            writeln!(out)?;
            utils::sep_to(&mut out)?;
        }
        Ok(())
    }
}
