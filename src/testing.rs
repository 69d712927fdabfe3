//! Fixtures shared by unit tests.

use std::path::{Path, PathBuf};

use crate::{
    catalog::Catalog,
    foundation::core::{Duration, Region, TaggedRegion},
    media::model::{Format, Source, Stamp},
    project::Project,
};

/// A placeholder font file; stamps only check that it exists.
pub(crate) fn font_file(dir: &Path) -> PathBuf {
    let path = dir.join("font.ttf");
    std::fs::write(&path, b"not really a font").unwrap();
    path
}

pub(crate) fn format(dir: &Path) -> Format {
    Format {
        stamp: Stamp {
            color: "white".to_string(),
            font: font_file(dir),
            size: 32,
        },
        ..Format::default()
    }
}

/// Create `<dir>/<name>` with a valid `format.json` and open it.
pub(crate) fn project(dir: &Path, name: &str) -> Project {
    let root = dir.join(name);
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(
        root.join("format.json"),
        serde_json::to_vec_pretty(&format(dir)).unwrap(),
    )
    .unwrap();
    Project::open(root).unwrap()
}

/// Source whose regions are `(start_secs, end_secs, "space separated tags")`.
pub(crate) fn source(key: &str, regions: &[(u64, u64, &str)]) -> Source {
    Source::new(
        key,
        regions
            .iter()
            .map(|(s, e, tags)| {
                TaggedRegion::new(Region::new(Duration::from_secs(*s), Duration::from_secs(*e)))
                    .with_tags(tags.split_whitespace())
            })
            .collect(),
    )
}

pub(crate) fn catalog(dir: &Path, sources: &[Source]) -> Catalog {
    let catalog = Catalog::new(dir.join("catalog"), "SHA-256").unwrap();
    for s in sources {
        catalog.create(s).unwrap();
    }
    catalog
}
