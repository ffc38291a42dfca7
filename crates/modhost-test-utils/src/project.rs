//! Module projects written to disk and packed into archives.

use std::fs;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// Description of a module project to write and pack.
///
/// # Example
///
/// ```rust,no_run
/// use modhost_test_utils::{ModuleProject, TestHost};
///
/// let host = TestHost::new();
/// host.add(ModuleProject::new("org.example.ui").depends_on(&["org.example.core"]));
/// host.add(ModuleProject::new("org.example.core"));
/// ```
#[derive(Debug, Clone)]
pub struct ModuleProject {
    symbolic_name: String,
    version: String,
    dependencies: Vec<String>,
    activator: Option<String>,
    resources: Vec<(String, Vec<u8>)>,
    extensions: Option<String>,
    manifest: Option<String>,
}

impl ModuleProject {
    pub fn new(symbolic_name: &str) -> Self {
        Self {
            symbolic_name: symbolic_name.to_string(),
            version: "1.0.0".to_string(),
            dependencies: Vec::new(),
            activator: None,
            resources: Vec::new(),
            extensions: None,
            manifest: None,
        }
    }

    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.dependencies
            .extend(dependencies.iter().map(|d| d.to_string()));
        self
    }

    pub fn activator(mut self, id: &str) -> Self {
        self.activator = Some(id.to_string());
        self
    }

    pub fn resource(mut self, path: &str, content: &[u8]) -> Self {
        self.resources.push((path.to_string(), content.to_vec()));
        self
    }

    pub fn extensions(mut self, text: &str) -> Self {
        self.extensions = Some(text.to_string());
        self
    }

    /// Use `text` verbatim as the manifest instead of generating one.
    pub fn raw_manifest(mut self, text: &str) -> Self {
        self.manifest = Some(text.to_string());
        self
    }

    /// The manifest text this project writes.
    pub fn manifest_text(&self) -> String {
        if let Some(text) = &self.manifest {
            return text.clone();
        }

        let mut text = format!(
            "name: {name}\nsymbolicName: {name}\nversion: {}\n",
            self.version,
            name = self.symbolic_name
        );
        if let Some(activator) = &self.activator {
            text.push_str(&format!("activator: {activator}\n"));
        }
        if self.dependencies.is_empty() {
            text.push_str("dependencies: -\n");
        } else {
            text.push_str(&format!("dependencies: {}\n", self.dependencies.join(", ")));
        }
        if !self.resources.is_empty() {
            let paths: Vec<&str> = self.resources.iter().map(|(p, _)| p.as_str()).collect();
            text.push_str(&format!("resources: {}\n", paths.join(", ")));
        }
        text
    }

    /// Write the project into `dir`. Returns the artifact path.
    pub fn write(&self, dir: &Path) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("MANIFEST.MF"), self.manifest_text()).unwrap();
        if let Some(extensions) = &self.extensions {
            fs::write(dir.join("EXTENSIONS.MF"), extensions).unwrap();
        }
        for (path, content) in &self.resources {
            let target = dir.join(path);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, content).unwrap();
        }

        let artifact = dir.join(format!("{}.bin", self.symbolic_name));
        fs::write(&artifact, format!("artifact of {}", self.symbolic_name)).unwrap();
        artifact
    }
}

/// A scratch directory with a `projects/` tree and a `modules/` directory
/// of packed archives.
pub struct TestHost {
    temp_dir: TempDir,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    pub fn new() -> Self {
        let host = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(host.modules_dir()).unwrap();
        host
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root().join("modules")
    }

    pub fn project_dir(&self, symbolic_name: &str) -> PathBuf {
        self.root().join("projects").join(symbolic_name)
    }

    /// Write and pack `project` into the modules directory. Returns the
    /// archive path.
    pub fn add(&self, project: ModuleProject) -> PathBuf {
        let dir = self.project_dir(project.symbolic_name());
        let artifact = project.write(&dir);
        modhost_package::pack(&dir, &artifact, &self.modules_dir())
            .unwrap_or_else(|e| panic!("packing {} failed: {e}", project.symbolic_name()))
    }

    pub fn add_all(&self, projects: impl IntoIterator<Item = ModuleProject>) -> Vec<PathBuf> {
        projects.into_iter().map(|p| self.add(p)).collect()
    }

    /// Drop arbitrary bytes into the modules directory.
    pub fn write_module_file(&self, file_name: &str, content: &[u8]) -> PathBuf {
        let path = self.modules_dir().join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a gzip tar archive with exactly `entries` into the modules
    /// directory, bypassing the package builder's validation.
    pub fn write_archive(&self, file_name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, *data).unwrap();
        }
        let bytes = builder.into_inner().unwrap().finish().unwrap();
        self.write_module_file(file_name, &bytes)
    }

    /// A runtime configuration pointing at this host's modules directory.
    pub fn config(&self) -> modhost_runtime::RuntimeConfig {
        modhost_runtime::RuntimeConfig::default().with_modules_dir(self.modules_dir())
    }
}
