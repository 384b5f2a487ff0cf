//! Machine-list parsing and default-file resolution.

use crate::TailmuxError;

/// Inline `host:path` path parts shorter than this are treated as
/// absent and fall back to the default file.
const MIN_INLINE_PATH_BYTES: usize = 3;

/// One host to tail, fully resolved. Immutable for the run's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineTarget {
    pub host: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MachineEntry {
    host: String,
    path: Option<String>,
}

fn parse_entry(raw: &str) -> MachineEntry {
    match raw.split_once(':') {
        Some((host, path)) if path.len() >= MIN_INLINE_PATH_BYTES => MachineEntry {
            host: host.to_string(),
            path: Some(path.to_string()),
        },
        Some((host, _)) => MachineEntry {
            host: host.to_string(),
            path: None,
        },
        None => MachineEntry {
            host: raw.to_string(),
            path: None,
        },
    }
}

/// Expands one or more space-separated `host[:path]` lists into ordered
/// targets, applying `default_file` to entries without an inline path.
///
/// Entry order is preserved across lists; it is the order streams are
/// started in and the order the registry holds them.
pub fn resolve_targets(
    lists: &[String],
    default_file: Option<&str>,
) -> Result<Vec<MachineTarget>, TailmuxError> {
    let entries: Vec<MachineEntry> = lists
        .iter()
        .flat_map(|list| list.split_whitespace())
        .map(parse_entry)
        .collect();

    if entries.is_empty() {
        return Err(TailmuxError::NoMachines);
    }

    entries
        .into_iter()
        .map(|entry| {
            let path = match entry.path.or_else(|| default_file.map(str::to_string)) {
                Some(path) => path,
                None => {
                    return Err(TailmuxError::MissingPath { host: entry.host });
                }
            };
            Ok(MachineTarget {
                host: entry.host,
                path,
            })
        })
        .collect()
}
