use std::io::Write;

use anyhow::{Context, Result, bail};
use engine::{Engine, MAPS_DIRECTORY_NAME, ResourceConfig, ResourcePath};

use crate::cli::{Cli, Command};

/// Owns the engine for the duration of one command.
pub struct App {
    engine: Engine,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => ResourceConfig::load(path)?,
            None => ResourceConfig::default(),
        };
        if !cli.sources.is_empty() {
            config.sources = cli.sources.clone();
        }
        if cli.budget.is_some() {
            config.zone_budget = cli.budget;
        }
        if config.sources.is_empty() {
            bail!("no sources given: pass --source or --config");
        }
        Ok(App {
            engine: Engine::new(config),
        })
    }

    pub fn init(&mut self) {
        self.engine.init();
    }

    pub fn run(&mut self, command: &Command) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match command {
            Command::Dump => self.engine.resources.dump(&mut out)?,
            Command::List { directory } => {
                for path in self
                    .engine
                    .resources
                    .list_directory(&ResourcePath::parse(directory))
                {
                    writeln!(out, "{}", path)?;
                }
            }
            Command::Info { path } => self.info(&mut out, &ResourcePath::parse(path))?,
            Command::Extract { path, out: file } => {
                let path = ResourcePath::parse(path);
                let id = self.engine.resources.resolve(&path);
                if !id.is_valid() {
                    bail!("{} not found", path);
                }
                let data = self
                    .engine
                    .load(id)
                    .with_context(|| format!("failed to load {}", path))?;
                std::fs::write(file, data)
                    .with_context(|| format!("failed to write {:?}", file))?;
                log::info!("wrote {} bytes to {}", data.len(), file.display());
            }
            Command::Hashes => {
                let names = self.engine.resources.file_names().to_vec();
                let hashes = self.engine.resources.file_hashes()?;
                for (name, hash) in names.iter().zip(hashes) {
                    writeln!(out, "{}  {}", hash, name.display())?;
                }
            }
            Command::Maps => {
                let maps = ResourcePath::root().join(MAPS_DIRECTORY_NAME);
                let resources = &self.engine.resources;
                for path in resources.list_directory(&maps) {
                    // map lumps live one level further down
                    if path.len() != maps.len() + 1 {
                        continue;
                    }
                    let id = resources.resolve(&path);
                    writeln!(
                        out,
                        "{} [{}]",
                        path.last(),
                        resources
                            .container_file_name(id)
                            .map(|p| p.display().to_string())
                            .unwrap_or_default()
                    )?;
                }
            }
        }
        Ok(())
    }

    fn info(&self, out: &mut impl Write, path: &ResourcePath) -> Result<()> {
        let resources = &self.engine.resources;
        let ids = resources.resolve_all(path);
        if ids.is_empty() {
            bail!("{} not found", path);
        }
        let winner = resources.resolve(path);
        for id in ids {
            writeln!(
                out,
                "{} {} {} bytes from {} ({} {})",
                id,
                if id == winner { "active    " } else { "overridden" },
                resources.size(id)?,
                resources
                    .container_file_name(id)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<generated>".to_string()),
                resources.container_kind(id).unwrap_or("?"),
                resources
                    .container_id(id)
                    .map(|c| c.to_string())
                    .unwrap_or_default()
            )?;
        }
        Ok(())
    }
}
