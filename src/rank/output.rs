//! Result file writer

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use webrank_algorithms::RankedNode;

/// First line of every result file
pub const HEADER: &str = "Top 10 URLs with Highest Page Rank values.";

/// Write the header followed by one `<id> : <rank>` line per node
pub fn render_top_ranks<W: Write>(writer: &mut W, top: &[RankedNode]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for entry in top {
        writeln!(writer, "{} : {}", entry.node, entry.rank)?;
    }
    Ok(())
}

/// Create or truncate `path` and write the ranking into it
pub fn write_top_ranks(path: impl AsRef<Path>, top: &[RankedNode]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    render_top_ranks(&mut writer, top)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_format() {
        let top = vec![
            RankedNode { node: 1, rank: 0.5 },
            RankedNode { node: 4, rank: 0.25 },
        ];
        let mut buffer = Vec::new();
        render_top_ranks(&mut buffer, &top).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Top 10 URLs with Highest Page Rank values.\n1 : 0.5\n4 : 0.25\n"
        );
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranks.txt");
        std::fs::write(&path, "stale contents that are longer than the new output\n".repeat(10)).unwrap();

        write_top_ranks(&path, &[RankedNode { node: 0, rank: 1.0 }]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}\n0 : 1\n", HEADER));
    }

    #[test]
    fn test_empty_ranking_writes_header_only() {
        let mut buffer = Vec::new();
        render_top_ranks(&mut buffer, &[]).unwrap();
        assert_eq!(buffer, format!("{}\n", HEADER).into_bytes());
    }
}
