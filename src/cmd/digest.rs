use std::io::{self, BufRead};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use warden::hash::get_hash;

use super::RunCommand;

/// Print the SHA-256 digest of a token, as expected by the `tokens` table of
/// a token authenticator.
#[derive(Args)]
pub struct DigestArgs {
    /// The token. Read from the first line of stdin when omitted, which keeps
    /// it out of the shell history.
    pub token: Option<String>,
}

#[async_trait]
impl RunCommand for DigestArgs {
    async fn run(&self) -> Result<()> {
        let token = match self.token {
            Some(ref token) => token.clone(),
            None => {
                let mut line = String::new();
                io::stdin()
                    .lock()
                    .read_line(&mut line)
                    .context("read token from stdin")?;
                line.trim_end_matches(['\r', '\n']).to_string()
            }
        };
        if token.is_empty() {
            bail!("token cannot be empty");
        }

        println!("{}", get_hash(token.as_bytes()));
        Ok(())
    }
}
