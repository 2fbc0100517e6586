use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use warden::config::load_config;
use warden::directory::MemoryDirectory;
use warden::model::effective_permissions;
use warden::{AuthConfig, AuthFactory, RuleSet};

use super::RunCommand;

/// Validate an auth config and show the resulting chain and groups.
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the TOML config file.
    pub config: PathBuf,

    /// Print the completed config as JSON instead.
    #[arg(long)]
    pub json: bool,
}

#[async_trait]
impl RunCommand for CheckArgs {
    async fn run(&self) -> Result<()> {
        if !self.config.exists() {
            bail!("config file {} does not exist", self.config.display());
        }
        let cfg: AuthConfig = load_config(&self.config)?;

        // Nodes only need a directory to exist at build time.
        let module = AuthFactory::new(&cfg)
            .with_directory(Arc::new(MemoryDirectory::new()))
            .build(RuleSet::default())
            .with_context(|| format!("check config {}", self.config.display()))?;

        if self.json {
            let data = serde_json::to_string_pretty(&cfg).context("encode config to json")?;
            println!("{data}");
            return Ok(());
        }

        println!("Chain: {}", module.authenticator().names().join(" -> "));
        let groups = module.groups();
        if groups.is_empty() {
            println!("Groups: none");
            return Ok(());
        }
        println!("Groups:");
        for name in groups.names() {
            let Some(group) = groups.get(name) else {
                continue;
            };
            let permissions: Vec<_> = effective_permissions([group.as_ref()])
                .into_iter()
                .map(|p| p.to_string())
                .collect();
            println!("  {name}: {}", permissions.join(", "));
        }
        Ok(())
    }
}
