use crate::core_client::input::LocalCommand;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as Process;

/// Runs a `!` command against the client's local directory.
///
/// `!cd` updates `local_dir` in place; `!ls` and `!pwd` write the command's
/// output to `out`.
pub async fn run_local<W: Write>(command: &LocalCommand, local_dir: &mut PathBuf, out: &mut W) -> io::Result<()> {
    match command {
        LocalCommand::Ls => run_shell("ls", local_dir, out).await,
        LocalCommand::Pwd => run_shell("pwd", local_dir, out).await,
        LocalCommand::Cd(dir) => {
            match directory(&local_dir.join(dir)).await {
                Some(new_dir) => *local_dir = new_dir,
                None => writeln!(out, "fail to change directory: {}", dir)?,
            }
            Ok(())
        }
    }
}

/// Canonical form of `path` if it names an existing directory.
async fn directory(path: &Path) -> Option<PathBuf> {
    let dir = tokio::fs::canonicalize(path).await.ok()?;
    let metadata = tokio::fs::metadata(&dir).await.ok()?;
    metadata.is_dir().then_some(dir)
}

async fn run_shell<W: Write>(program: &str, dir: &Path, out: &mut W) -> io::Result<()> {
    let output = Process::new("sh")
        .arg("-c")
        .arg(program)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .await?;
    out.write_all(&output.stdout)?;
    out.flush()
}
