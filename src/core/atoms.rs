// ReelMend - core/atoms.rs
//
// Built-in repair engine for ISO base media (MP4/MOV-style) containers.
//
// A container is a sequence of atoms: a 32-bit big-endian size, a 4-byte
// type, and a payload.  A size of 1 means a 64-bit size follows the type; a
// size of 0 means the atom extends to the end of the file.  A truncated file
// typically ends inside its last atom, whose declared size then runs past
// EOF.  The engine keeps every complete top-level atom, drops the torn tail,
// and reports how much of the file survived.

use crate::core::engine::{RepairEngine, RepairSession};
use crate::core::model::{RepairSettings, Truncation};
use crate::util::constants;
use crate::util::error::FailureInfo;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// Atom headers
// =============================================================================

/// Parsed header of one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    /// Four-character type code, e.g. `*b"moov"`.
    pub kind: [u8; 4],

    /// Absolute byte offset of the header.
    pub offset: u64,

    /// Total atom size including the header.
    pub size: u64,

    /// Header length: 8, or 16 with an extended size.
    pub header_len: u64,
}

impl Atom {
    /// Type code as text; non-printable bytes become `?`.
    pub fn kind_str(&self) -> String {
        self.kind
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }

    /// Offset just past the atom; saturates for sizes no file can hold.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    pub fn is_container(&self) -> bool {
        constants::CONTAINER_ATOMS.contains(&self.kind_str().as_str())
    }
}

/// What was found at a header position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRead {
    /// A complete atom lying within `[offset, limit)`.
    Complete(Atom),

    /// An atom whose declared size runs past `limit`.
    Torn(Atom),

    /// Fewer than 8 bytes remained, or the declared size is impossible.
    Garbage,
}

/// Read the atom header at `offset`, with `limit` as the end of the
/// enclosing region (the file length at top level).
pub fn read_header<R: Read + Seek>(reader: &mut R, offset: u64, limit: u64) -> io::Result<HeaderRead> {
    if limit.saturating_sub(offset) < 8 {
        return Ok(HeaderRead::Garbage);
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut head = [0u8; 8];
    reader.read_exact(&mut head)?;

    let size32 = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
    let kind = [head[4], head[5], head[6], head[7]];

    let (size, header_len) = match size32 {
        0 => (limit - offset, 8),
        1 => {
            if limit - offset < 16 {
                return Ok(HeaderRead::Garbage);
            }
            let mut ext = [0u8; 8];
            reader.read_exact(&mut ext)?;
            (u64::from_be_bytes(ext), 16)
        }
        n => (u64::from(n), 8),
    };

    if size < header_len {
        return Ok(HeaderRead::Garbage);
    }

    let atom = Atom {
        kind,
        offset,
        size,
        header_len,
    };
    match offset.checked_add(size) {
        Some(end) if end <= limit => Ok(HeaderRead::Complete(atom)),
        _ => Ok(HeaderRead::Torn(atom)),
    }
}

/// Result of walking the top-level atoms of a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopLevel {
    /// Complete atoms in file order.
    pub atoms: Vec<Atom>,

    /// The torn atom at the end of the file, if any.
    pub torn: Option<Atom>,

    /// Set when trailing bytes could not be read as an atom header.
    pub trailing_garbage: bool,

    /// File length in bytes.
    pub len: u64,
}

impl TopLevel {
    /// Bytes covered by complete atoms.
    pub fn covered(&self) -> u64 {
        self.atoms.last().map_or(0, Atom::end)
    }

    pub fn truncation(&self) -> Truncation {
        let premature_end = self.torn.is_some() || self.trailing_garbage;
        let premature_percentage = if self.len == 0 {
            0.0
        } else {
            self.covered() as f64 / self.len as f64
        };
        Truncation {
            premature_end,
            premature_percentage,
        }
    }

    pub fn has_kind(&self, kind: &[u8; 4]) -> bool {
        self.atoms.iter().any(|a| &a.kind == kind)
    }
}

/// Walk the top-level atoms of `reader`, reporting progress by offset.
pub fn scan_top_level<R: Read + Seek>(
    reader: &mut R,
    len: u64,
    progress: &mut dyn FnMut(u8),
) -> io::Result<TopLevel> {
    let mut top = TopLevel {
        len,
        ..Default::default()
    };
    let mut offset = 0;

    while offset < len {
        match read_header(reader, offset, len)? {
            HeaderRead::Complete(atom) => {
                offset = atom.end();
                top.atoms.push(atom);
                progress(percent_of(offset, len));
            }
            HeaderRead::Torn(atom) => {
                top.torn = Some(atom);
                break;
            }
            HeaderRead::Garbage => {
                top.trailing_garbage = true;
                break;
            }
        }
    }

    Ok(top)
}

/// `part / whole` as a whole percentage, clamped to 0-100.
pub fn percent_of(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 100;
    }
    ((part.min(whole) as u128 * 100) / whole as u128) as u8
}

fn open_with_len(path: &Path) -> io::Result<(File, u64)> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

// =============================================================================
// Engine
// =============================================================================

/// Repair engine that keeps the complete top-level atoms of each target.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomEngine;

impl RepairEngine for AtomEngine {
    fn name(&self) -> &str {
        "atoms"
    }

    fn open_session(
        &self,
        reference: &Path,
        settings: &RepairSettings,
    ) -> Result<Box<dyn RepairSession>, FailureInfo> {
        let (mut file, len) =
            open_with_len(reference).map_err(|e| FailureInfo::io("open reference", &e))?;
        let top = scan_top_level(&mut file, len, &mut |_| {})
            .map_err(|e| FailureInfo::io("read reference", &e))?;

        if top.atoms.is_empty() || top.truncation().premature_end {
            return Err(FailureInfo::new("not a complete container"));
        }

        let reference_kinds = top.atoms.iter().map(|a| a.kind).collect();
        tracing::debug!(
            reference = %reference.display(),
            atoms = top.atoms.len(),
            "Reference parsed"
        );

        Ok(Box::new(AtomSession {
            reference_kinds,
            settings: *settings,
            truncation: Truncation::default(),
            warnings: Vec::new(),
        }))
    }
}

/// Per-item session seeded with the atom types seen in the reference.
struct AtomSession {
    reference_kinds: BTreeSet<[u8; 4]>,
    settings: RepairSettings,
    truncation: Truncation,
    warnings: Vec<String>,
}

impl AtomSession {
    fn is_known(&self, atom: &Atom) -> bool {
        self.reference_kinds.contains(&atom.kind)
            || constants::KNOWN_TOP_LEVEL_ATOMS.contains(&atom.kind_str().as_str())
    }

    fn output_path(&self, target: &Path) -> PathBuf {
        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut name = format!(
            "{stem}{}{}",
            constants::REPAIRED_FILE_INFIX,
            self.settings.output_suffix()
        );
        if let Some(ext) = target.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        target.with_file_name(name)
    }
}

impl RepairSession for AtomSession {
    fn repair(
        &mut self,
        target: &Path,
        log: &mut dyn Write,
        progress: &mut dyn FnMut(u8),
    ) -> Result<PathBuf, FailureInfo> {
        self.warnings.clear();

        let (mut file, len) = open_with_len(target).map_err(|e| FailureInfo::io("open", &e))?;
        // Scanning is the first half of the work, copying the second.
        let top = scan_top_level(&mut file, len, &mut |p| progress(p / 2))
            .map_err(|e| FailureInfo::io("read", &e))?;
        self.truncation = top.truncation();

        if let Some(torn) = top.torn {
            let _ = writeln!(
                log,
                "'{}' atom at offset {} claims {} bytes, only {} present",
                torn.kind_str(),
                torn.offset,
                torn.size,
                len - torn.offset
            );
        }

        if top.atoms.is_empty() {
            return Err(FailureInfo::new("no complete atom found"));
        }
        for kind in constants::REQUIRED_ATOMS {
            if self.reference_kinds.contains(kind) && !top.has_kind(kind) {
                return Err(FailureInfo::new(format!(
                    "missing '{}' atom present in the reference",
                    String::from_utf8_lossy(kind)
                )));
            }
        }

        let mut keep = Vec::with_capacity(top.atoms.len());
        for atom in &top.atoms {
            if self.is_known(atom) {
                keep.push(*atom);
            } else if self.settings.skip_unknown {
                let _ = writeln!(
                    log,
                    "skipping unknown '{}' atom at offset {}",
                    atom.kind_str(),
                    atom.offset
                );
            } else {
                self.warnings.push(format!(
                    "unknown '{}' atom at offset {} kept as-is",
                    atom.kind_str(),
                    atom.offset
                ));
                keep.push(*atom);
            }
        }

        let output = self.output_path(target);
        let total: u64 = keep.iter().map(|a| a.size).sum();
        let written = write_atoms(&mut file, &keep, &output, total, &mut |p| {
            progress(50 + p / 2)
        })
        .map_err(|e| FailureInfo::io("write repaired file", &e))?;

        let _ = writeln!(
            log,
            "kept {} atom(s), {written} of {len} bytes ({:.1} %)",
            keep.len(),
            self.truncation.premature_percentage * 100.0
        );

        Ok(output)
    }

    fn truncation(&self) -> Truncation {
        self.truncation
    }

    fn hidden_warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }
}

/// Copy `atoms` from `source` into a new file at `output`.
fn write_atoms(
    source: &mut File,
    atoms: &[Atom],
    output: &Path,
    total: u64,
    progress: &mut dyn FnMut(u8),
) -> io::Result<u64> {
    let mut sink = BufWriter::new(File::create(output)?);
    let mut written = 0;
    for atom in atoms {
        source.seek(SeekFrom::Start(atom.offset))?;
        let copied = io::copy(&mut (&mut *source).take(atom.size), &mut sink)?;
        if copied != atom.size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("'{}' atom shrank while copying", atom.kind_str()),
            ));
        }
        written += copied;
        progress(percent_of(written, total));
    }
    sink.flush()?;
    Ok(written)
}
