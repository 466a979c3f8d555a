//! Sample file seeding for demos and smoke tests.

use std::path::Path;

use tracing::info;

/// `(name, repeated line, repeat count)` for each sample file. The
/// large file exceeds 1 MiB so a download exercises multiple chunks.
const SAMPLES: &[(&str, &str, usize)] = &[
    ("small_file.txt", "This is a small test file.\n", 100),
    ("medium_file.txt", "This is a medium test file.\n", 10_000),
    ("large_file.txt", "This is a large test file.\n", 100_000),
];

/// Creates the sample files under `root`, skipping any that already
/// exist. Returns the names of the files created.
pub async fn seed(root: &Path) -> std::io::Result<Vec<String>> {
    tokio::fs::create_dir_all(root).await?;

    let mut created = Vec::new();
    for (name, line, repeat) in SAMPLES {
        let path = root.join(name);
        if tokio::fs::try_exists(&path).await? {
            continue;
        }
        tokio::fs::write(&path, line.repeat(*repeat)).await?;
        info!(name, "created sample file");
        created.push(name.to_string());
    }
    Ok(created)
}
