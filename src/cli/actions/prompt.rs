use anyhow::{bail, Result};
use secrecy::SecretString;
use tokio::io::{stdin, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

/// Line prompts on stderr, answers from stdin. Input is not masked.
pub(crate) struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    pub(crate) fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    pub(crate) async fn line(&mut self, label: &str) -> Result<String> {
        let mut stderr = tokio::io::stderr();
        stderr.write_all(label.as_bytes()).await?;
        stderr.flush().await?;

        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim_end_matches('\r').to_string()),
            None => bail!("no input: stdin is closed"),
        }
    }

    pub(crate) async fn secret(&mut self, label: &str) -> Result<SecretString> {
        self.line(label).await.map(SecretString::from)
    }

    /// Uses `value` when given, otherwise asks for it.
    pub(crate) async fn secret_or(
        &mut self,
        value: Option<SecretString>,
        label: &str,
    ) -> Result<SecretString> {
        match value {
            Some(value) => Ok(value),
            None => self.secret(label).await,
        }
    }
}
