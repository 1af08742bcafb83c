use anyhow::{bail, Context, Result};
use std::process::Command;

use super::Source;

/// Runs a local command on every refresh and shows its stdout
pub struct CmdRunner {
    cmd: String,
    args: Vec<String>,
}

impl CmdRunner {
    pub fn new(cmd: String, args: Vec<String>) -> Self {
        Self { cmd, args }
    }
}

impl Source for CmdRunner {
    fn fetch(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.cmd)
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to run {}", self.cmd))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().next().unwrap_or("").trim();
            match output.status.code() {
                Some(code) => bail!("{} exited with {}: {}", self.cmd, code, reason),
                None => bail!("{} was terminated by a signal", self.cmd),
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout_lines() {
        let runner = CmdRunner::new("printf".to_string(), vec!["one\\ntwo\\n".to_string()]);
        assert_eq!(runner.fetch().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let runner = CmdRunner::new(
            "sh".to_string(),
            vec!["-c".to_string(), "echo nope >&2; exit 3".to_string()],
        );
        let err = runner.fetch().unwrap_err().to_string();
        assert_eq!(err, "sh exited with 3: nope");
    }

    #[test]
    fn test_missing_binary_is_error() {
        let runner = CmdRunner::new("definitely-not-a-real-binary".to_string(), vec![]);
        let err = format!("{:#}", runner.fetch().unwrap_err());
        assert!(err.starts_with("Failed to run definitely-not-a-real-binary"));
    }
}
