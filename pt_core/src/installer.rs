/*!
 * Download, unpack and build a package.
 *
 * Every risky step waits for the user:
 *   confirm -> download -> list archive -> confirm -> extract -> makepkg
 * The scratch directory used for unpacking never outlives acquire().
 */
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use duct::cmd;
use flate2::read::GzDecoder;
use tempfile::TempDir;

use crate::query::Repository;
use crate::{printerror, printinfo, AcquireMode, AcquisitionError, Prompter, ResultRecord};

pub const INSTALL_WARNING: &str = "WARNING: Packages can contain malicious code. Install only from trusted sources.";
const RECIPE_FILE: &str = "PKGBUILD";
const PARTIAL_EXT: &str = "part";

/// How an acquisition ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Declined,
    Downloaded(PathBuf),
    Installed(PathBuf),
}

/**
 * External build/install command, run inside the recipe directory.
 * Default is `makepkg -sir`: sync deps, install, remove build files.
 */
#[derive(Debug, Clone)]
pub struct BuildTool {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for BuildTool {
    fn default() -> Self {
        return BuildTool { program: "makepkg".into(), args: vec!["-sir".into()] };
    }
}

impl BuildTool {
    pub fn run(&self, dir: &Path) -> Result<(), AcquisitionError> {
        printinfo!("Running {} {} in {dir:?}", self.program, self.args.join(" "));
        // stdin/stdout stay attached to the terminal, makepkg may ask for a password.
        let output = cmd(&self.program, &self.args)
            .dir(dir)
            .unchecked()
            .run()?;

        if !output.status.success() {
            return Err(AcquisitionError::BuildToolFailed {
                tool: self.program.to_owned(),
                status: output.status.to_string(),
            });
        }
        return Ok(());
    }
}

/// Scratch space for one install. Dropping or closing it removes the directory.
#[derive(Debug)]
pub struct AcquisitionSession<'a> {
    record: &'a ResultRecord,
    work_dir: TempDir,
    artifact: PathBuf,
}

impl<'a> AcquisitionSession<'a> {
    pub fn open(record: &'a ResultRecord, artifact: PathBuf, temp_root: Option<&Path>) -> std::io::Result<AcquisitionSession<'a>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("acheron-");
        let work_dir = match temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        return Ok(AcquisitionSession { record, work_dir, artifact });
    }

    pub fn work_dir(&self) -> &Path {
        return self.work_dir.path();
    }

    /// Copy the downloaded artifact into the scratch directory.
    fn stage_artifact(&self) -> Result<PathBuf, AcquisitionError> {
        let file_name = self.artifact.file_name()
            .ok_or_else(|| AcquisitionError::DataFormat(format!("{:?} has no file name", self.artifact)))?;
        let staged = self.work_dir().join(file_name);
        fs::copy(&self.artifact, &staged)?;
        return Ok(staged);
    }

    pub fn close(self) -> std::io::Result<()> {
        return self.work_dir.close();
    }
}

pub struct Installer<'r> {
    repo: &'r dyn Repository,
    build_tool: BuildTool,
    temp_root: Option<PathBuf>,
}

impl<'r> Installer<'r> {
    pub fn new(repo: &'r dyn Repository) -> Installer<'r> {
        return Installer { repo, build_tool: BuildTool::default(), temp_root: None };
    }
    pub fn build_tool(mut self, tool: BuildTool) -> Installer<'r> {
        self.build_tool = tool;
        return self;
    }
    /// Where scratch directories are created. Defaults to the system temp dir.
    pub fn temp_root<P: Into<PathBuf>>(mut self, root: P) -> Installer<'r> {
        self.temp_root = Some(root.into());
        return self;
    }

    pub fn acquire(
        &self,
        record: &ResultRecord,
        mode: AcquireMode,
        output_dir: &Path,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> Result<Acquisition, AcquisitionError> {
        let (url_path, filename) = match (record.url_path(), record.artifact_filename()) {
            (Some(url_path), Some(filename)) => (url_path, filename.to_string()),
            _ => return Err(AcquisitionError::DataFormat(format!("'{}' has no usable URLPath", record.name()))),
        };

        let question = match mode {
            AcquireMode::DownloadAndInstall => {
                writeln!(out, "{INSTALL_WARNING}")?;
                format!("Install package {} anyway? [N,y] ", record.name())
            },
            AcquireMode::DownloadOnly => format!("Download {filename}? [N,y] "),
        };
        if !prompter.confirm(&question) {
            printinfo!("Cancelled, nothing was downloaded.");
            return Ok(Acquisition::Declined);
        }

        ensure_output_dir(output_dir)?;
        printinfo!("Downloading...");
        let artifact = self.download(url_path, &filename, output_dir)?;
        printinfo!("Downloaded. Saved as {artifact:?}");

        if mode == AcquireMode::DownloadOnly {
            return Ok(Acquisition::Downloaded(artifact));
        }

        let session = AcquisitionSession::open(record, artifact, self.temp_root.as_deref())?;
        let res = self.install(&session, prompter, out);

        let work_dir = session.work_dir().to_path_buf();
        if let Err(msg) = session.close() {
            printerror!("Could not remove {work_dir:?}: {msg}");
        }
        return res;
    }

    fn download(&self, url_path: &str, filename: &str, output_dir: &Path) -> Result<PathBuf, AcquisitionError> {
        /*!
         * Stream the artifact into {output_dir}/{filename}.part, then rename.
         * A failed transfer leaves nothing behind.
         */
        let url = self.repo.artifact_url(url_path);
        let dest = output_dir.join(filename);
        let partial = output_dir.join(format!("{filename}.{PARTIAL_EXT}"));

        let mut reader = self.repo.fetch_artifact(url_path)?;
        if let Err(msg) = stream_to_file(&mut reader, &partial, &dest) {
            let _ = fs::remove_file(&partial);
            return Err(AcquisitionError::Download { url, reason: msg.to_string() });
        }
        return Ok(dest);
    }

    fn install(&self, session: &AcquisitionSession, prompter: &mut dyn Prompter, out: &mut dyn Write) -> Result<Acquisition, AcquisitionError> {
        let archive = session.stage_artifact()?;

        writeln!(out, "Package contains the following entries:")?;
        for entry in list_entries(&archive)? {
            writeln!(out, "{entry}")?;
        }
        out.flush()?;

        if !prompter.confirm("\nProceed with extraction? [N,y] ") {
            printinfo!("Extraction cancelled.");
            return Ok(Acquisition::Downloaded(session.artifact.to_owned()));
        }

        printinfo!("Extracting...");
        extract(&archive, session.work_dir())?;
        printinfo!("Extracted.");

        printinfo!("Searching for {RECIPE_FILE} file...");
        let recipe_dir = find_recipe_dir(session.work_dir(), session.record.name())?;
        printinfo!("{RECIPE_FILE} found.");

        self.build_tool.run(&recipe_dir)?;
        printinfo!("Installation was successful!");
        return Ok(Acquisition::Installed(session.artifact.to_owned()));
    }
}

pub fn ensure_output_dir(path: &Path) -> Result<(), AcquisitionError> {
    //! Create {path} if needed. Never touches an existing non-directory, dangling symlinks included.
    return match fs::symlink_metadata(path) {
        Ok(_) if path.is_dir() => Ok(()),
        Ok(_) => Err(AcquisitionError::InvalidOutputDirectory(path.to_path_buf())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(path)?;
            Ok(())
        },
        Err(err) => Err(err.into()),
    };
}

fn stream_to_file(reader: &mut dyn Read, partial: &Path, dest: &Path) -> std::io::Result<u64> {
    let mut writer = BufWriter::new(File::create(partial)?);
    let written = std::io::copy(reader, &mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(partial, dest)?;
    return Ok(written);
}

fn open_archive(path: &Path) -> Result<tar::Archive<GzDecoder<File>>, AcquisitionError> {
    let file = File::open(path).map_err(|source| AcquisitionError::Archive { path: path.to_path_buf(), source })?;
    return Ok(tar::Archive::new(GzDecoder::new(file)));
}

pub fn list_entries(path: &Path) -> Result<Vec<String>, AcquisitionError> {
    let archive_err = |source: std::io::Error| AcquisitionError::Archive { path: path.to_path_buf(), source };
    let mut archive = open_archive(path)?;
    let mut output = Vec::new();

    for entry in archive.entries().map_err(archive_err)? {
        let entry = entry.map_err(archive_err)?;
        output.push(entry.path().map_err(archive_err)?.display().to_string());
    }
    return Ok(output);
}

pub fn extract(path: &Path, dest: &Path) -> Result<(), AcquisitionError> {
    let mut archive = open_archive(path)?;
    return archive.unpack(dest).map_err(|source| AcquisitionError::Archive { path: path.to_path_buf(), source });
}

pub fn find_recipe_dir(root: &Path, pkg_name: &str) -> Result<PathBuf, AcquisitionError> {
    /*!
     * {root}/<dir>/PKGBUILD -> {root}/<dir>
     * Snapshots hold one directory. If there are more, prefer the one named after the package.
     */
    let not_found = || AcquisitionError::BuildRecipeNotFound(root.to_path_buf());
    let pattern = format!("{}/*/{RECIPE_FILE}", glob::Pattern::escape(&root.to_string_lossy()));

    let candidates: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|_| not_found())?
        .filter_map(|path| path.ok())
        .filter(|path| path.is_file())
        .filter_map(|path| path.parent().map(|dir| dir.to_path_buf()))
        .collect();

    return candidates.iter()
        .find(|dir| dir.file_name().is_some_and(|name| name == pkg_name))
        .or(candidates.first())
        .cloned()
        .ok_or_else(not_found);
}
