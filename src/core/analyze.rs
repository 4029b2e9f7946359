// ReelMend - core/analyze.rs
//
// Analyze phase: prints the atom tree of a single file.
//
// Container atoms (`moov`, `trak`, ...) are descended into up to
// MAX_ATOM_DEPTH levels; payload atoms are listed with offset and size.  A
// torn atom is listed and marked, and ends the walk of its parent.

use crate::core::atoms::{self, Atom, HeaderRead};
use crate::core::batch::BatchObserver;
use crate::core::model::AnalysisStats;
use crate::util::constants;
use crate::util::error::FailureInfo;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

/// Print the atom tree of `path` through `observer`.
///
/// Progress is reported on the observer's phase as top-level atoms are
/// walked.  Writes the completion marker when the walk finishes.
pub fn analyze(path: &Path, observer: &dyn BatchObserver) -> Result<AnalysisStats, FailureInfo> {
    let file = File::open(path).map_err(|e| FailureInfo::io("open", &e).with_path(path))?;
    let len = file
        .metadata()
        .map_err(|e| FailureInfo::io("stat", &e).with_path(path))?
        .len();
    let mut reader = BufReader::new(file);

    tracing::info!(file = %path.display(), bytes = len, "Analysis started");
    observer.status(format!("Analyzing {}", path.display()));
    observer.output(&format!("'{}' ({len} bytes)\n", path.display()));
    observer.progress(0);

    let mut stats = AnalysisStats::default();
    let mut lines = String::new();
    let top = atoms::scan_top_level(&mut reader, len, &mut |_| {})
        .map_err(|e| FailureInfo::io("read", &e).with_path(path))?;

    for atom in &top.atoms {
        walk(&mut reader, atom, 0, &mut stats, &mut lines)
            .map_err(|e| FailureInfo::io("read", &e).with_path(path))?;
        observer.output(&std::mem::take(&mut lines));
        observer.progress(atoms::percent_of(atom.end(), len));
    }

    if let Some(torn) = top.torn {
        stats.atoms += 1;
        observer.output(&format!(
            "{} @{} size {} (torn: only {} bytes present)\n",
            torn.kind_str(),
            torn.offset,
            torn.size,
            len - torn.offset
        ));
    }
    if top.trailing_garbage {
        observer.output(&format!(
            "unreadable data after offset {}\n",
            top.covered()
        ));
    }

    stats.truncation = top.truncation();
    if stats.truncation.premature_end {
        observer.output(&format!(
            "premature end: {:.1} % of the file is covered by complete atoms\n",
            stats.truncation.premature_percentage * 100.0
        ));
    }

    observer.progress(100);
    observer.output(constants::COMPLETION_MARKER);
    observer.status(format!("{} atom(s) found", stats.atoms));

    tracing::info!(file = %path.display(), atoms = stats.atoms, "Analysis complete");
    Ok(stats)
}

/// Append `atom` and, for containers, its children to `lines`.
fn walk<R: Read + Seek>(
    reader: &mut R,
    atom: &Atom,
    depth: usize,
    stats: &mut AnalysisStats,
    lines: &mut String,
) -> io::Result<()> {
    if stats.atoms >= constants::MAX_ANALYZED_ATOMS {
        return Ok(());
    }
    stats.atoms += 1;
    lines.push_str(&format!(
        "{:indent$}{} @{} size {}\n",
        "",
        atom.kind_str(),
        atom.offset,
        atom.size,
        indent = depth * 2
    ));

    if !atom.is_container() || depth + 1 >= constants::MAX_ATOM_DEPTH {
        return Ok(());
    }

    let mut offset = atom.offset + atom.header_len;
    while offset < atom.end() {
        match atoms::read_header(reader, offset, atom.end())? {
            HeaderRead::Complete(child) => {
                walk(reader, &child, depth + 1, stats, lines)?;
                offset = child.end();
            }
            HeaderRead::Torn(child) => {
                stats.atoms += 1;
                lines.push_str(&format!(
                    "{:indent$}{} @{} size {} (overruns parent)\n",
                    "",
                    child.kind_str(),
                    child.offset,
                    child.size,
                    indent = (depth + 1) * 2
                ));
                break;
            }
            HeaderRead::Garbage => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atoms::tests::{atom, sample_container};
    use crate::core::model::Notice;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        output: RefCell<String>,
        progress: RefCell<Vec<u8>>,
    }

    impl BatchObserver for Recorder {
        fn output(&self, text: &str) {
            self.output.borrow_mut().push_str(text);
        }
        fn progress(&self, percentage: u8) {
            self.progress.borrow_mut().push(percentage);
        }
        fn notify(&self, _notice: Notice) {}
    }

    #[test]
    fn test_analyze_prints_nested_tree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("good.mp4");
        std::fs::write(&path, sample_container()).unwrap();
        let rec = Recorder::default();

        let stats = analyze(&path, &rec).unwrap();

        let output = rec.output.borrow();
        assert!(output.contains("ftyp @0"));
        assert!(output.contains("\n  mvhd @"), "child must be indented: {output}");
        assert_eq!(stats.atoms, 4);
        assert!(!stats.truncation.premature_end);
        assert_eq!(output.matches("done!").count(), 1);
        assert_eq!(rec.progress.borrow().last(), Some(&100));
    }

    #[test]
    fn test_analyze_marks_torn_atom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("torn.mp4");
        let mut data = atom(b"ftyp", b"isom");
        data.extend(atom(b"mdat", &[1; 32]));
        data.truncate(data.len() - 8);
        std::fs::write(&path, data).unwrap();
        let rec = Recorder::default();

        let stats = analyze(&path, &rec).unwrap();

        assert!(stats.truncation.premature_end);
        assert!(rec.output.borrow().contains("torn"));
    }

    #[test]
    fn test_analyze_child_with_wrapping_size_overruns_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hostile.mp4");
        let mut child = 1u32.to_be_bytes().to_vec();
        child.extend_from_slice(b"trak");
        child.extend_from_slice(&(u64::MAX - 8).to_be_bytes());
        child.extend_from_slice(&[0; 8]);
        let mut data = atom(b"ftyp", b"isom\0\0\0\0");
        data.extend(atom(b"moov", &child));
        std::fs::write(&path, data).unwrap();
        let rec = Recorder::default();

        let stats = analyze(&path, &rec).unwrap();

        assert_eq!(stats.atoms, 3);
        assert!(rec.output.borrow().contains("  trak @24 size "));
        assert!(rec.output.borrow().contains("(overruns parent)"));
    }

    #[test]
    fn test_analyze_missing_file_fails() {
        let rec = Recorder::default();
        let result = analyze(Path::new("/nonexistent/reelmend/clip.mp4"), &rec);
        assert!(result.is_err());
        assert!(rec.output.borrow().is_empty());
    }
}
