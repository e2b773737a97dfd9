use std::{path::PathBuf, time::Duration};

use quadsquish::{CompressionParameters, TreeStats};

const MIB: f64 = 1024.0 * 1024.0;

/// Summary printed after a compression run.
pub struct Report {
    pub output: PathBuf,
    pub elapsed: Duration,
    pub width: u32,
    pub height: u32,
    pub params: CompressionParameters,
    pub input_size: u64,
    pub output_size: Option<u64>,
    pub stats: TreeStats,
}

impl Report {
    /// Output size divided by input size, if both are known and the input
    /// is not empty.
    pub fn compression_ratio(&self) -> Option<f64> {
        match self.output_size {
            Some(output) if self.input_size > 0 => Some(output as f64 / self.input_size as f64),
            _ => None,
        }
    }

    /// How much smaller the output is than the input, in percent.
    pub fn compression_percentage(&self) -> Option<f64> {
        self.compression_ratio().map(|ratio| (1.0 - ratio) * 100.0)
    }

    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Output path", self.output.display().to_string()),
            ("Execution time", format!("{:.3} ms", self.elapsed.as_secs_f64() * 1000.0)),
            ("Resolution", format!("{}x{}", self.width, self.height)),
            ("Error metric", self.params.metric.to_string()),
            ("Threshold", self.params.threshold.to_string()),
            ("Minimum block", self.params.min_block_area.to_string()),
            ("Size before", format_size(self.input_size)),
        ];

        match self.output_size {
            Some(size) => lines.push(("Size after", format_size(size))),
            None => lines.push(("Size after", "unknown".to_string())),
        }

        match (self.compression_ratio(), self.compression_percentage()) {
            (Some(ratio), Some(percentage)) => {
                lines.push(("Compression ratio", format!("{ratio:.6}")));
                lines.push(("Compression percentage", format!("{percentage:.2} %")));
            }
            _ => {
                lines.push(("Compression ratio", "N/A".to_string()));
                lines.push(("Compression percentage", "N/A".to_string()));
            }
        }

        lines.push(("Max tree depth", self.stats.max_depth.to_string()));
        lines.push(("Total nodes", self.stats.node_count.to_string()));
        lines.push(("Leaf blocks", self.stats.leaf_count.to_string()));

        lines
    }

    pub fn print(&self) {
        println!("--- Statistics ---");
        for (label, value) in self.lines() {
            println!("{label:<23}: {value}");
        }
    }
}

fn format_size(bytes: u64) -> String {
    format!("{:.6} MiB ({bytes} bytes)", bytes as f64 / MIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(input_size: u64, output_size: Option<u64>) -> Report {
        Report {
            output: PathBuf::from("out.png"),
            elapsed: Duration::from_millis(12),
            width: 640,
            height: 480,
            params: CompressionParameters::default(),
            input_size,
            output_size,
            stats: TreeStats {
                node_count: 21,
                leaf_count: 16,
                max_depth: 2,
            },
        }
    }

    #[test]
    fn ratio_and_percentage() {
        let report = report(1000, Some(250));

        assert_eq!(report.compression_ratio(), Some(0.25));
        assert_eq!(report.compression_percentage(), Some(75.0));
    }

    #[test]
    fn empty_input_has_no_ratio() {
        let report = report(0, Some(250));

        assert_eq!(report.compression_ratio(), None);
        assert!(report.lines().contains(&("Compression ratio", "N/A".to_string())));
    }

    #[test]
    fn sizes_in_mebibytes() {
        assert_eq!(format_size(1024 * 1024), "1.000000 MiB (1048576 bytes)");
    }

    #[test]
    fn tree_counters_are_listed() {
        let lines = report(10, None).lines();

        assert!(lines.contains(&("Size after", "unknown".to_string())));
        assert!(lines.contains(&("Total nodes", "21".to_string())));
        assert!(lines.contains(&("Max tree depth", "2".to_string())));
    }
}
