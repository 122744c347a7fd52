//! RFC 1035 compressed name decoding (RFC 1035 section 4.1.4)
//!
//! NETLOGON responses pack their names back to back, each one a run of
//! length-prefixed labels closed either by a zero byte or by a two-byte
//! compression pointer to labels written earlier:
//!
//! ```text
//! 04 'corp' 07 'example' 03 'com' 00      corp.example.com
//! 03 'dc1' C0 18                          dc1.<labels at offset 0x18>
//! ```
//!
//! Only the second pointer byte is used as the target offset, which limits
//! targets to the first 256 bytes of the addressed buffer.

use crate::error::DecodeError;
use std::collections::BTreeMap;
use tracing::trace;

/// Top two bits set marks a compression pointer
const POINTER_MASK: u8 = 0xc0;

/// What was seen at a given offset of the name region
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Label(String),
    Pointer(usize),
    Terminator,
}

/// Offsets of every label, pointer and terminator seen so far, in wire order
#[derive(Debug, Default)]
struct LabelTable {
    entries: BTreeMap<usize, Entry>,
}

impl LabelTable {
    fn insert(&mut self, offset: usize, entry: Entry) {
        self.entries.insert(offset, entry);
    }

    /// Resolve the label chain starting at `target` into a dotted suffix
    ///
    /// The chain runs through consecutive entries until a terminator or the
    /// end of the table. A recorded pointer continues the chain at its own
    /// target.
    fn resolve(&self, target: usize, pointer_offset: usize) -> Result<String, DecodeError> {
        match self.entries.get(&target) {
            None => {
                return Err(DecodeError::name(
                    pointer_offset,
                    format!("pointer target {} is not the start of a label", target),
                ))
            }
            Some(Entry::Terminator) => {
                return Err(DecodeError::name(
                    pointer_offset,
                    format!("pointer target {} is a name terminator", target),
                ))
            }
            Some(_) => {}
        }

        let mut labels: Vec<&str> = Vec::new();
        let mut followed = vec![target];
        let mut start = target;
        'chain: loop {
            for (_, entry) in self.entries.range(start..) {
                match entry {
                    Entry::Label(label) => labels.push(label),
                    Entry::Terminator => break 'chain,
                    Entry::Pointer(next) => {
                        if followed.contains(next) {
                            return Err(DecodeError::name(
                                pointer_offset,
                                format!("pointer loop through offset {}", next),
                            ));
                        }
                        followed.push(*next);
                        start = *next;
                        continue 'chain;
                    }
                }
            }
            break;
        }
        Ok(labels.join("."))
    }
}

/// Accumulates the labels of the name currently being read
#[derive(Debug, Default)]
struct NameBuilder {
    current: Option<String>,
}

impl NameBuilder {
    fn push(&mut self, part: &str) {
        match &mut self.current {
            Some(name) => {
                name.push('.');
                name.push_str(part);
            }
            None => self.current = Some(part.to_string()),
        }
    }

    fn finish(&mut self) -> String {
        self.current.take().unwrap_or_default()
    }
}

/// Decode every terminated name in `region`, in order
///
/// `base` is the offset of `region` within the buffer that compression
/// pointers address: `0` when pointers are relative to the region itself,
/// the header length when they are relative to the enclosing message.
/// Offsets in errors are reported in the same coordinates.
pub fn decompress_names(region: &[u8], base: usize) -> Result<Vec<String>, DecodeError> {
    let mut names = Vec::new();
    let mut table = LabelTable::default();
    let mut name = NameBuilder::default();
    let end = region.len();
    let mut pos = 0;

    while pos < end {
        let byte = region[pos];
        let offset = base + pos;

        if byte == 0 {
            let complete = name.finish();
            trace!("name {} ends at offset {}: {:?}", names.len(), offset, complete);
            names.push(complete);
            table.insert(offset, Entry::Terminator);
            pos += 1;
        } else if byte & POINTER_MASK == POINTER_MASK {
            let target = *region
                .get(pos + 1)
                .ok_or_else(|| DecodeError::name(offset, "pointer truncated by end of region"))?
                as usize;
            let suffix = table.resolve(target, offset)?;
            name.push(&suffix);
            let complete = name.finish();
            trace!(
                "name {} ends with pointer to {} at offset {}: {:?}",
                names.len(),
                target,
                offset,
                complete
            );
            names.push(complete);
            table.insert(offset, Entry::Pointer(target));
            pos += 2;
        } else {
            let len = byte as usize;
            if pos + 1 + len > end {
                return Err(DecodeError::name(
                    offset,
                    format!(
                        "label of {} bytes runs past end of region ({} bytes left)",
                        len,
                        end - pos - 1
                    ),
                ));
            }
            let label = String::from_utf8_lossy(&region[pos + 1..pos + 1 + len]).into_owned();
            name.push(&label);
            table.insert(offset, Entry::Label(label));
            pos += 1 + len;
        }
    }

    Ok(names)
}

/// Encode dotted names without compression, each closed by a zero byte
///
/// The empty string encodes as a lone terminator.
pub fn encode_names<S: AsRef<str>>(names: &[S]) -> Vec<u8> {
    let mut buf = Vec::new();
    for name in names {
        for label in name.as_ref().split('.').filter(|l| !l.is_empty()) {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
        buf.push(0);
    }
    buf
}
