//! Opening rendered artifacts in a viewer.
//!
//! [`Launcher`] starts an external program, by default the desktop's
//! "open with default application" command.

use std::{
    io,
    path::Path,
    process::{Command, Stdio},
};

use log::debug;

/// Shows a rendered artifact to the user.
pub trait Viewer: Send + Sync {
    /// Opens `path`.
    ///
    /// # Errors
    ///
    /// Returns the error that kept the viewer from starting.
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Opens artifacts by launching a program with the artifact path as its last
/// argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    program: String,
    args: Vec<String>,
}

impl Launcher {
    /// Creates a launcher running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds an argument placed before the artifact path.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns the program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[cfg(target_os = "macos")]
impl Default for Launcher {
    fn default() -> Self {
        Self::new("open")
    }
}

#[cfg(windows)]
impl Default for Launcher {
    fn default() -> Self {
        Self::new("cmd").with_arg("/C").with_arg("start").with_arg("")
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
impl Default for Launcher {
    fn default() -> Self {
        Self::new("xdg-open")
    }
}

impl Viewer for Launcher {
    /// The program is started detached; this returns as soon as it is
    /// launched.
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!(command:? = command; "Launching viewer");
        command.spawn()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let launcher = Launcher::new("blueprint-no-such-viewer");

        let err = launcher.open(Path::new("diagram.png")).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_with_arg() {
        let launcher = Launcher::new("cmd").with_arg("/C").with_arg("start");

        assert_eq!(launcher.program(), "cmd");
        assert_eq!(launcher.args, ["/C", "start"]);
    }
}
