// src/tools/kind.rs

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported merge tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MergerKind {
    JDime,
    FstMerge,
    IntelliMerge,
    AutoMerge,
    KDiff3,
    Wiggle,
    Summer,
}

impl MergerKind {
    pub const ALL: [MergerKind; 7] = [
        MergerKind::JDime,
        MergerKind::FstMerge,
        MergerKind::IntelliMerge,
        MergerKind::AutoMerge,
        MergerKind::KDiff3,
        MergerKind::Wiggle,
        MergerKind::Summer,
    ];

    /// Name used for the per-tool result directory and in config keys.
    pub fn name(self) -> &'static str {
        match self {
            MergerKind::JDime => "JDime",
            MergerKind::FstMerge => "FSTMerge",
            MergerKind::IntelliMerge => "IntelliMerge",
            MergerKind::AutoMerge => "AutoMerge",
            MergerKind::KDiff3 => "KDiff3",
            MergerKind::Wiggle => "Wiggle",
            MergerKind::Summer => "summer",
        }
    }

    /// Recognise the tool from the path of its executable or jar.
    ///
    /// The check is a case-insensitive substring match on the whole path,
    /// so both `/opt/IntelliMerge/IntelliMerge-1.0.9-all.jar` and
    /// `/opt/intellimerge/run.jar` work. The first match in the order below
    /// wins.
    pub fn detect(path: &Path) -> Option<Self> {
        let lower = path.to_string_lossy().to_lowercase();
        [
            ("summer", MergerKind::Summer),
            ("automerge", MergerKind::AutoMerge),
            ("fstmerge", MergerKind::FstMerge),
            ("intellimerge", MergerKind::IntelliMerge),
            ("jdime", MergerKind::JDime),
            ("kdiff3", MergerKind::KDiff3),
            ("wiggle", MergerKind::Wiggle),
        ]
        .into_iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, kind)| kind)
    }

    /// Whether the tool reads base/left/right from checked-out directories.
    ///
    /// summer works on the repository and commit ids directly.
    pub fn needs_worktrees(self) -> bool {
        !matches!(self, MergerKind::Summer)
    }

    /// Built-in stderr signatures after which the tool never exits.
    pub fn default_fatal_signatures(self) -> &'static [&'static str] {
        match self {
            // Worker threads swallow the exception and the JVM keeps running.
            MergerKind::IntelliMerge => &[
                "concurrent.ExecutionException",
                "at edu.pku.intellimerge.client.IntelliMerge.main(IntelliMerge.java",
            ],
            _ => &[],
        }
    }

    /// Stderr signatures meaning the tool cannot work in this environment.
    ///
    /// Unlike fatal signatures these are checked after the run, and abort
    /// the whole batch: every further scenario would fail the same way.
    pub fn abort_signatures(self) -> &'static [(&'static str, &'static str)] {
        const FSTMERGE_HINT: &str = "FSTMerge calls git with incorrect command line options. \
            featurehouse_20220107.jar included in ConflictBench may only be used on Linux. \
            See https://github.com/joliebig/featurehouse/blob/81724157bc638524e72af5bb689cf939e6df8599/fstmerge/merger/LineBasedMerger.java#L93-L96";
        match self {
            MergerKind::FstMerge => &[
                (r#"Cannot run program "C:\Programme\cygwin\bin\git.exe""#, FSTMERGE_HINT),
                ("unknown option: --merge-file", FSTMERGE_HINT),
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for MergerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MergerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MergerKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = MergerKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown merger '{wanted}' (expected one of {})", names.join(", "))
            })
    }
}
