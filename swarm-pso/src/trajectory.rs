//! Trajectory files (NDJSON).
//!
//! Layout: one [`TrajectoryHeader`] line followed by one [`Snapshot`] line per
//! state callback (iteration 0 is the initialized swarm). The file is written
//! to `<name>.tmp` and renamed into place by [`TrajectoryRecorder::finish`],
//! so a reader never sees a partial trajectory under the final name. A
//! recorder dropped without finishing removes its temporary file.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use swarm_pso_core::numeric::Numeric;
use swarm_pso_core::observe::Snapshot;
use swarm_pso_core::swarm::Swarm;
use swarm_pso_core::traits::SwarmObserver;

use crate::error::{Result, RunError};
use crate::{Backend, ObjectiveKind};

pub const SCHEMA_VERSION_V1: u32 = 1;

/// First line of a trajectory file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryHeader {
    pub schema_version: u32,
    pub objective: ObjectiveKind,
    pub backend: Backend,
    pub num_particles: usize,
    pub dimensions: usize,
    pub max_iterations: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub seed: u64,
}

/// A trajectory file read back into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub header: TrajectoryHeader,
    pub snapshots: Vec<Snapshot>,
}

/// Observer that streams every swarm state into a trajectory file.
///
/// Observers cannot fail, so the first write error is latched and every later
/// callback is skipped; [`finish`](Self::finish) reports it.
pub struct TrajectoryRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
    // Declared after `writer` so the file is closed before it is removed.
    tmp: PendingFile,
    hasher: Sha256,
    snapshots: usize,
    error: Option<io::Error>,
}

/// Deletes the temporary file on drop unless it was moved into place.
struct PendingFile {
    path: PathBuf,
    renamed: bool,
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.renamed {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::debug!(path = %self.path.display(), error = %e, "temporary trajectory not removed");
            }
        }
    }
}

impl TrajectoryRecorder {
    /// Create the temporary file and write the header line
    pub fn create(path: impl AsRef<Path>, header: &TrajectoryHeader) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tmp_path = tmp_path_for(&path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(RunError::io(parent))?;
        }
        let file = File::create(&tmp_path).map_err(RunError::io(&tmp_path))?;

        let mut recorder = Self {
            path,
            writer: BufWriter::new(file),
            tmp: PendingFile {
                path: tmp_path,
                renamed: false,
            },
            hasher: Sha256::new(),
            snapshots: 0,
            error: None,
        };
        recorder
            .write_line(header)
            .map_err(RunError::io(&recorder.tmp.path))?;
        Ok(recorder)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshots written so far
    pub fn snapshots(&self) -> usize {
        self.snapshots
    }

    /// Flush, move the file into place and return its SHA-256 (lowercase hex).
    ///
    /// On error the temporary file is removed.
    pub fn finish(mut self) -> Result<String> {
        if let Some(source) = self.error.take() {
            return Err(RunError::Io {
                path: self.tmp.path.clone(),
                source,
            });
        }
        self.writer
            .flush()
            .and_then(|()| self.writer.get_ref().sync_all())
            .map_err(RunError::io(&self.tmp.path))?;
        fs::rename(&self.tmp.path, &self.path).map_err(RunError::io(&self.path))?;
        self.tmp.renamed = true;
        Ok(hex::encode(self.hasher.finalize()))
    }

    fn write_line<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        let mut line = serde_json::to_vec(record).map_err(io::Error::from)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.hasher.update(&line);
        Ok(())
    }
}

impl<N: Numeric> SwarmObserver<N> for TrajectoryRecorder {
    fn on_state(&mut self, iteration: usize, swarm: &Swarm<N>) {
        if self.error.is_some() {
            return;
        }
        match self.write_line(&Snapshot::capture(iteration, swarm)) {
            Ok(()) => self.snapshots += 1,
            Err(e) => {
                tracing::error!(path = %self.tmp.path.display(), error = %e, "trajectory write failed");
                self.error = Some(e);
            }
        }
    }
}

/// Read a trajectory file written by [`TrajectoryRecorder`]
pub fn read_trajectory(path: impl AsRef<Path>) -> Result<Trajectory> {
    let path = path.as_ref();
    let file = File::open(path).map_err(RunError::io(path))?;
    let mut lines = BufReader::new(file).lines();

    let malformed = |reason: String| RunError::Trajectory {
        path: path.to_path_buf(),
        reason,
    };

    let first = lines
        .next()
        .ok_or_else(|| malformed("missing header".to_string()))?
        .map_err(RunError::io(path))?;
    let header: TrajectoryHeader = serde_json::from_str(&first).map_err(RunError::json(path))?;
    if header.schema_version != SCHEMA_VERSION_V1 {
        return Err(malformed(format!(
            "unsupported schema version {}",
            header.schema_version
        )));
    }

    let mut snapshots = Vec::new();
    for line in lines {
        let line = line.map_err(RunError::io(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let snapshot: Snapshot = serde_json::from_str(&line).map_err(RunError::json(path))?;
        if snapshot.iteration != snapshots.len() {
            return Err(malformed(format!(
                "expected iteration {}, found {}",
                snapshots.len(),
                snapshot.iteration
            )));
        }
        snapshots.push(snapshot);
    }

    Ok(Trajectory { header, snapshots })
}

/// SHA-256 of a file on disk (lowercase hex)
pub fn sha256_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(RunError::io(path))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(RunError::io(path))?;
    Ok(hex::encode(hasher.finalize()))
}

fn tmp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RunError::InvalidArgument(format!("invalid file name: {}", path.display())))?;
    Ok(path.with_file_name(format!("{file_name}.tmp")))
}
