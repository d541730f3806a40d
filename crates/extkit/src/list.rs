//! `extkit list` — list projects under the configured root.

use std::path::Path;

use crate::config::Config;

pub fn run(config: &Config) -> anyhow::Result<()> {
    let projects = match project_names(&config.root) {
        Ok(projects) => projects,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No projects yet ({} does not exist).", config.root.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Projects in {}:", config.root.display());
    if projects.is_empty() {
        println!("  (none)");
    }
    for project in &projects {
        println!("  {project}");
    }

    Ok(())
}

/// Sorted names of the directories directly under `root`.
fn project_names(root: &Path) -> std::io::Result<Vec<String>> {
    let mut projects: Vec<String> = std::fs::read_dir(root)?
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    projects.sort();
    Ok(projects)
}
