//! Library closure resolution.
//!
//! Starting from one user source file, follow its library includes and
//! collect the include flags and source files needed to compile it
//! together with the fixed core manifest.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{CoreManifest, FirmwareLayout};
use crate::resolver::errors::ResolveError;
use crate::resolver::include::{self, IncludeDirective};
use crate::util::fs::{files_with_extension, read_lossy};

/// Source extensions compiled from a library folder, in order.
pub const LIBRARY_SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "cxx"];

/// The result handed to the compiler driver.
///
/// `ok == false` always comes with both lists empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildClosure {
    pub ok: bool,
    /// `-I<absolute dir>` flags
    pub include_paths: Vec<String>,
    /// Absolute source paths; the root file comes first
    pub source_files: Vec<PathBuf>,
}

impl BuildClosure {
    /// The empty, failed closure.
    pub fn failed() -> Self {
        BuildClosure::default()
    }

    /// Collapse a resolution result into the success-flag form.
    pub fn from_result(result: Result<BuildClosure, ResolveError>) -> Self {
        result.unwrap_or_else(|e| {
            tracing::debug!("resolution failed: {}", e);
            BuildClosure::failed()
        })
    }
}

/// Insertion-ordered set.
#[derive(Debug)]
struct OrderedSet<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    fn new() -> Self {
        OrderedSet {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns false if the item was already present.
    fn insert(&mut self, item: T) -> bool {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.insert(item);
        }
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// A library reference confirmed against the library tree.
#[derive(Debug, Clone)]
struct LibraryRef {
    dir: PathBuf,
    header: PathBuf,
}

/// Resolves build closures against one firmware layout.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    layout: &'a FirmwareLayout,
    manifest: &'a CoreManifest,
}

impl<'a> Resolver<'a> {
    pub fn new(layout: &'a FirmwareLayout, manifest: &'a CoreManifest) -> Self {
        Resolver { layout, manifest }
    }

    /// Resolve the closure of `root_file`, creating `out_dir` if needed.
    pub fn resolve(&self, root_file: &Path, out_dir: &Path) -> Result<BuildClosure, ResolveError> {
        let root_file = std::path::absolute(root_file).map_err(|source| ResolveError::Read {
            path: root_file.to_path_buf(),
            source,
        })?;

        if !root_file.is_file() {
            return Err(ResolveError::NotFound { path: root_file });
        }

        if !out_dir.exists() {
            std::fs::create_dir_all(out_dir).map_err(|source| ResolveError::OutputDir {
                path: out_dir.to_path_buf(),
                source,
            })?;
        }

        let mut includes = OrderedSet::new();
        let mut sources = OrderedSet::new();
        sources.insert(root_file.clone());

        let text = read_lossy(&root_file).map_err(|source| ResolveError::Read {
            path: root_file.clone(),
            source,
        })?;

        let mut libraries = Vec::new();
        for directive in include::scan(&text) {
            let Some(library) = self.confirm_library(&directive) else {
                continue;
            };

            if !includes.insert(format!("-I{}", library.dir.display())) {
                continue;
            }

            tracing::debug!("using library {}", library.dir.display());
            for ext in LIBRARY_SOURCE_EXTENSIONS {
                sources.extend(scan_dir(&library.dir, ext)?);
            }
            libraries.push(library);
        }

        let extra_drivers = self.core_drivers_for(&libraries)?;
        let core_sources = self
            .manifest
            .sources(self.layout, &extra_drivers)
            .map_err(|e| ResolveError::Scan {
                path: self.layout.core_dir(),
                message: format!("{:#}", e),
            })?;
        sources.extend(core_sources);

        includes.extend(
            self.manifest
                .include_dirs(self.layout)
                .iter()
                .map(|dir| format!("-I{}", dir.display())),
        );

        Ok(BuildClosure {
            ok: true,
            include_paths: includes.into_vec(),
            source_files: sources.into_vec(),
        })
    }

    /// Check a directive against the library tree. Directives that do not
    /// resolve to `libraries/<name>/<file>` are assumed to be system or core
    /// headers and ignored.
    fn confirm_library(&self, directive: &IncludeDirective) -> Option<LibraryRef> {
        let name = directive.library_name()?;
        let dir = self.layout.library_dir(name);
        let header = dir.join(directive.file_name());

        if dir.is_dir() && header.is_file() {
            Some(LibraryRef { dir, header })
        } else {
            tracing::trace!("ignoring include \"{}\"", directive.header);
            None
        }
    }

    /// Core driver sources pulled in by the headers of the used libraries.
    ///
    /// Only one level deep: library headers are scanned for core headers,
    /// libraries are not followed transitively.
    fn core_drivers_for(&self, libraries: &[LibraryRef]) -> Result<Vec<PathBuf>, ResolveError> {
        let mut drivers = OrderedSet::new();

        for library in libraries {
            let text = read_lossy(&library.header).map_err(|source| ResolveError::Read {
                path: library.header.clone(),
                source,
            })?;

            for directive in include::scan(&text) {
                let Some(src) = self.manifest.driver_source_for(self.layout, &directive.header)
                else {
                    continue;
                };
                if src.is_file() && drivers.insert(src.clone()) {
                    tracing::debug!(
                        "{} requires core driver {}",
                        library.header.display(),
                        src.display()
                    );
                }
            }
        }

        Ok(drivers.into_vec())
    }
}

fn scan_dir(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, ResolveError> {
    files_with_extension(dir, ext).map_err(|e| ResolveError::Scan {
        path: dir.to_path_buf(),
        message: format!("{:#}", e),
    })
}

/// Resolve the library closure of `root_file`.
pub fn resolve(
    root_file: &Path,
    layout: &FirmwareLayout,
    manifest: &CoreManifest,
    out_dir: &Path,
) -> Result<BuildClosure, ResolveError> {
    Resolver::new(layout, manifest).resolve(root_file, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FirmwareFixture;

    fn core_include_flags(layout: &FirmwareLayout) -> Vec<String> {
        CoreManifest::stm32f10x()
            .include_dirs(layout)
            .iter()
            .map(|d| format!("-I{}", d.display()))
            .collect()
    }

    #[test]
    fn test_no_library_includes() {
        let fw = FirmwareFixture::new().with_core();
        let root = fw.write_project("blink.phr", "#include <stdint.h>\nint main() {}\n");

        let closure = resolve(&root, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir()).unwrap();
        let core = CoreManifest::stm32f10x().sources(&fw.layout(), &[]).unwrap();

        assert!(closure.ok);
        assert_eq!(closure.source_files[0], root);
        assert_eq!(&closure.source_files[1..], core.as_slice());
        assert_eq!(closure.include_paths, core_include_flags(&fw.layout()));
    }

    #[test]
    fn test_library_reference() {
        let fw = FirmwareFixture::new().with_core();
        fw.add_library("Motor", &["motor.c", "pid.cpp", "filter.cxx", "notes.txt"]);
        let root = fw.write_project("spin.phr", "#include \"Motor/Motor.h\"\n");

        let closure = resolve(&root, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir()).unwrap();
        let motor = fw.layout().library_dir("Motor");

        assert!(closure.ok);
        assert_eq!(closure.include_paths[0], format!("-I{}", motor.display()));
        assert_eq!(closure.include_paths.len(), 5);
        assert_eq!(
            &closure.source_files[..4],
            &[
                root.clone(),
                motor.join("motor.c"),
                motor.join("pid.cpp"),
                motor.join("filter.cxx"),
            ]
        );
        assert!(!closure.source_files.contains(&motor.join("notes.txt")));
    }

    #[test]
    fn test_bare_header_token() {
        let fw = FirmwareFixture::new().with_core();
        fw.add_library("Servo", &["servo.c"]);
        let root = fw.write_project("sweep.phr", "#include \"Servo.h\"\n");

        let closure = resolve(&root, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir()).unwrap();
        assert!(closure
            .source_files
            .contains(&fw.layout().library_dir("Servo").join("servo.c")));
    }

    #[test]
    fn test_folder_without_header_ignored() {
        let fw = FirmwareFixture::new().with_core();
        let lib = fw.layout().library_dir("Ghost");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("ghost.c"), "").unwrap();
        let root = fw.write_project("x.phr", "#include \"Ghost.h\"\n");

        let closure = resolve(&root, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir()).unwrap();

        assert!(closure.ok);
        assert!(!closure.source_files.contains(&lib.join("ghost.c")));
        assert_eq!(closure.include_paths, core_include_flags(&fw.layout()));
    }

    #[test]
    fn test_library_included_twice() {
        let fw = FirmwareFixture::new().with_core();
        fw.add_library("Motor", &["motor.c"]);
        let root = fw.write_project(
            "twice.phr",
            "#include \"Motor.h\"\n#include \"Motor/Motor.h\"\n#include \"Motor.h\"\n",
        );

        let closure = resolve(&root, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir()).unwrap();
        let motor = fw.layout().library_dir("Motor");
        let flag = format!("-I{}", motor.display());

        assert_eq!(closure.include_paths.iter().filter(|f| **f == flag).count(), 1);
        assert_eq!(
            closure
                .source_files
                .iter()
                .filter(|p| **p == motor.join("motor.c"))
                .count(),
            1
        );
    }

    #[test]
    fn test_deterministic() {
        let fw = FirmwareFixture::new().with_core();
        fw.add_library("Motor", &["b.c", "a.c"]);
        fw.add_library("Servo", &["servo.c"]);
        let root = fw.write_project("x.phr", "#include \"Servo.h\"\n#include \"Motor.h\"\n");

        let manifest = CoreManifest::stm32f10x();
        let first = resolve(&root, &fw.layout(), &manifest, &fw.out_dir()).unwrap();
        let second = resolve(&root, &fw.layout(), &manifest, &fw.out_dir()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_library_pulls_core_driver() {
        let fw = FirmwareFixture::new().with_core();
        fw.add_library("Display", &["display.c"]);
        std::fs::write(
            fw.layout().library_dir("Display").join("Display.h"),
            "#include <stm32f10x_spi.h>\n#include \"stm32f10x_gpio.h\"\n#include <stdint.h>\n",
        )
        .unwrap();
        let spi = fw.layout().stm_lib_src_dir().join("stm32f10x_spi.c");
        std::fs::write(&spi, "").unwrap();
        let root = fw.write_project("lcd.phr", "#include \"Display.h\"\n");

        let closure = resolve(&root, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir()).unwrap();

        assert_eq!(closure.source_files.iter().filter(|p| **p == spi).count(), 1);
        let gpio = fw.layout().stm_lib_src_dir().join("stm32f10x_gpio.c");
        assert_eq!(closure.source_files.iter().filter(|p| **p == gpio).count(), 1);
    }

    #[test]
    fn test_missing_root_file() {
        let fw = FirmwareFixture::new().with_core();
        let missing = fw.root().join("missing.phr");

        let result = resolve(&missing, &fw.layout(), &CoreManifest::stm32f10x(), &fw.out_dir());
        assert!(matches!(result, Err(ResolveError::NotFound { .. })));
        assert_eq!(BuildClosure::from_result(result), BuildClosure::failed());
    }

    #[test]
    fn test_uncreatable_out_dir() {
        let fw = FirmwareFixture::new().with_core();
        let root = fw.write_project("x.phr", "");
        let blocker = fw.root().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let result = resolve(
            &root,
            &fw.layout(),
            &CoreManifest::stm32f10x(),
            &blocker.join("out"),
        );
        assert!(matches!(result, Err(ResolveError::OutputDir { .. })));
    }

    #[test]
    fn test_unreadable_library_header_aborts() {
        let fw = FirmwareFixture::new().with_core();
        let layout = fw.layout();
        let manifest = CoreManifest::stm32f10x();
        let dir = fw.add_library("Motor", &[]);
        let header = dir.join("Motor.h");
        std::fs::remove_file(&header).unwrap();

        let resolver = Resolver::new(&layout, &manifest);
        let result = resolver.core_drivers_for(&[LibraryRef {
            dir,
            header: header.clone(),
        }]);

        match result {
            Err(ResolveError::Read { path, .. }) => assert_eq!(path, header),
            other => panic!("expected read error, got {:?}", other),
        }

        let closure = BuildClosure::from_result(
            resolver
                .core_drivers_for(&[LibraryRef {
                    dir: layout.library_dir("Motor"),
                    header,
                }])
                .map(|drivers| BuildClosure {
                    ok: true,
                    include_paths: Vec::new(),
                    source_files: drivers,
                }),
        );
        assert_eq!(closure, BuildClosure::failed());
    }

    #[test]
    fn test_failed_closure_is_empty() {
        let closure = BuildClosure::failed();
        assert!(!closure.ok);
        assert!(closure.include_paths.is_empty());
        assert!(closure.source_files.is_empty());
    }
}
