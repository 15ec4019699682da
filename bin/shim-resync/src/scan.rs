//! Finds running shim instances from /proc

use std::ffi::OsString;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;
use tracing::debug;

/// Flag that makes an instance register once and exit
pub const RELOAD_FLAG: &str = "--reload";

/// A running shim and the argv it was started with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimProcess {
    pub pid: u32,
    pub argv: Vec<OsString>,
}

impl ShimProcess {
    /// The argv to run for a one-shot re-registration
    pub fn reload_argv(&self) -> Vec<OsString> {
        let mut argv = self.argv.clone();
        argv.push(OsString::from(RELOAD_FLAG));
        argv
    }
}

/// Split a NUL separated `/proc/<pid>/cmdline` buffer into arguments
pub fn parse_cmdline(raw: &[u8]) -> Vec<OsString> {
    raw.split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| OsString::from_vec(arg.to_vec()))
        .collect()
}

/// Whether `argv` is a long-running instance of `binary`
pub fn is_shim_instance(argv: &[OsString], binary: &str) -> bool {
    let Some(program) = argv.first() else {
        return false;
    };
    let name_matches = Path::new(program)
        .file_name()
        .map(|name| name.as_bytes() == binary.as_bytes())
        .unwrap_or(false);

    name_matches
        && !argv[1..]
            .iter()
            .any(|arg| arg == RELOAD_FLAG || arg == "-reload")
}

/// List running instances of `binary` under `proc_root`, excluding `own_pid`
pub fn find_instances(
    proc_root: &Path,
    binary: &str,
    own_pid: u32,
) -> std::io::Result<Vec<ShimProcess>> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(proc_root)? {
        let entry = entry?;
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        if pid == own_pid {
            continue;
        }

        // Processes can exit between listing and reading
        let raw = match std::fs::read(entry.path().join("cmdline")) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Skipping pid {}: {}", pid, e);
                continue;
            }
        };

        let argv = parse_cmdline(&raw);
        if is_shim_instance(&argv, binary) {
            found.push(ShimProcess { pid, argv });
        }
    }

    found.sort_by_key(|p| p.pid);
    Ok(found)
}
