use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tank_combat_core::LevelLayout;
use tank_combat_game::{LevelSource, LevelSourceError};
use tracing::debug;

/// Level source reading `level{n}.txt` files from a directory.
#[derive(Clone, Debug)]
pub(crate) struct DirectoryLevelSource {
    root: PathBuf,
}

impl DirectoryLevelSource {
    /// Creates a source rooted at `root`.
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File expected to hold `level`.
    pub(crate) fn path_for(&self, level: u32) -> PathBuf {
        self.root.join(format!("level{level}.txt"))
    }

    /// Directory holding the level files.
    pub(crate) fn root(&self) -> &Path {
        &self.root
    }
}

impl LevelSource for DirectoryLevelSource {
    fn load(&self, level: u32) -> Result<Option<LevelLayout>, LevelSourceError> {
        let path = self.path_for(level);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(level, path = %path.display(), "level file not found");
                return Ok(None);
            }
            Err(source) => return Err(LevelSourceError::Io { level, path, source }),
        };

        LevelLayout::parse(&text)
            .map(Some)
            .map_err(|source| LevelSourceError::Layout { level, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_combat_core::{CellState, IVec2};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tank-combat-{name}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("scratch directory is writable");
        dir
    }

    #[test]
    fn shipped_levels_parse() {
        let source = DirectoryLevelSource::new(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("../../levels"),
        );
        for level in 1..=3 {
            let layout = source
                .load(level)
                .expect("shipped level is valid")
                .expect("shipped level exists");
            assert!(
                (0..13).any(|y| (0..13).any(|x| layout.get(IVec2::new(x, y))
                    == Some(CellState::Empty))),
                "level {level} has no open ground"
            );
        }
    }

    #[test]
    fn missing_file_means_no_more_levels() {
        let source = DirectoryLevelSource::new(scratch_dir("missing"));
        assert!(matches!(source.load(41), Ok(None)));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("level1.txt"), "WWW\n...\n").expect("write succeeds");
        let source = DirectoryLevelSource::new(&dir);

        let error = source.load(1).expect_err("three-cell rows are rejected");
        assert!(matches!(error, LevelSourceError::Layout { level: 1, .. }));
        assert_eq!(source.root(), dir.as_path());
    }
}
