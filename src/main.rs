use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use picevolve::config::{AppConfig, ConfigManager};
use picevolve::data::ExpressionLibrary;
use picevolve::engines::evaluation::{ConsoleProgressCallback, Renderer};
use picevolve::engines::expression::ExprTree;
use picevolve::{PicEvolve, PicEvolveError};

const CONFIG_FILE: &str = "picevolve.toml";
const POPULATION_FILE: &str = "population.txt";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2..]) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [args]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  init <size>                          Random initial population");
    eprintln!("  mutate <parent#> <size>              Mutations of a parent image");
    eprintln!("  crossover <mom#> <dad#> <size>       Crossover between two parent images");
    eprintln!("  generate <#> <width> <height> <file> Render one image at full resolution");
    eprintln!("  load                                 Load saved expressions as the population");
    eprintln!("  save <#>                             Save an expression to the library");
    eprintln!("  delete <#>                           Delete an expression from the library");
    eprintln!();
    eprintln!("Settings are read from {} when present.", CONFIG_FILE);
}

fn load_config() -> anyhow::Result<AppConfig> {
    let manager = ConfigManager::new();
    if Path::new(CONFIG_FILE).exists() {
        manager.load_from_file(CONFIG_FILE)?;
    } else {
        manager.load_from_env()?;
    }
    Ok(manager.get())
}

struct Session {
    config: AppConfig,
    engine: PicEvolve,
    population: ExpressionLibrary,
    library: ExpressionLibrary,
}

impl Session {
    fn new() -> anyhow::Result<Self> {
        let config = load_config()?;
        let engine = PicEvolve::new(config.evolution.clone())?;
        let population_path: PathBuf = config.rendering.images_dir.join(POPULATION_FILE);
        Ok(Self {
            population: ExpressionLibrary::open(population_path),
            library: ExpressionLibrary::open(&config.rendering.library_file),
            engine,
            config,
        })
    }

    fn current(&self) -> anyhow::Result<Vec<ExprTree>> {
        Ok(self.population.load(self.engine.parser())?)
    }

    fn expression(&self, index: usize) -> anyhow::Result<ExprTree> {
        let mut population = self.current()?;
        if index >= population.len() {
            return Err(PicEvolveError::NodeOutOfRange {
                index,
                size: population.len(),
            }
            .into());
        }
        Ok(population.swap_remove(index))
    }

    fn renderer(&self) -> anyhow::Result<Renderer> {
        Ok(Renderer::from_config(
            self.engine.evaluator().clone(),
            &self.config.rendering,
        )?)
    }

    /// Make `population` current: print it, store it and render previews
    fn install(&self, population: Vec<ExprTree>) -> anyhow::Result<()> {
        for (i, tree) in population.iter().enumerate() {
            println!("{}: {}", i, tree);
        }
        self.population.write_all(&population)?;
        let rendering = &self.config.rendering;
        self.renderer()?.write_previews(
            &population,
            rendering.preview_width,
            rendering.preview_height,
            &rendering.images_dir,
            &mut ConsoleProgressCallback,
        )?;
        Ok(())
    }
}

fn arg<T: std::str::FromStr>(args: &[String], i: usize, what: &str) -> anyhow::Result<T> {
    let raw = args
        .get(i)
        .with_context(|| format!("missing argument <{}>", what))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid <{}>: {}", what, raw))
}

fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let mut session = Session::new()?;

    match command {
        "init" => {
            let size = arg(args, 0, "size")?;
            let population = session.engine.initialize_population(size)?;
            session.install(population)
        }
        "mutate" => {
            let parent = session.expression(arg(args, 0, "parent#")?)?;
            let size = arg(args, 1, "size")?;
            let population = session.engine.mutate(&parent, size)?;
            session.install(population)
        }
        "crossover" => {
            let mom = session.expression(arg(args, 0, "mom#")?)?;
            let dad = session.expression(arg(args, 1, "dad#")?)?;
            let size = arg(args, 2, "size")?;
            let population = session.engine.crossover(&mom, &dad, size)?;
            session.install(population)
        }
        "generate" => {
            let tree = session.expression(arg(args, 0, "#")?)?;
            let width: usize = arg(args, 1, "width")?;
            let height: usize = arg(args, 2, "height")?;
            let file: PathBuf = arg(args, 3, "file")?;
            if width == 0 || height == 0 {
                bail!("width and height must be positive");
            }
            session.renderer()?.render_to_file(&tree, width, height, &file)?;
            log::info!("Wrote {}", file.display());
            Ok(())
        }
        "load" => {
            let population = session.library.load(session.engine.parser())?;
            session.install(population)
        }
        "save" => {
            let tree = session.expression(arg(args, 0, "#")?)?;
            session.library.append(&tree)?;
            log::info!("Saved {} to {}", tree, session.library.path().display());
            Ok(())
        }
        "delete" => {
            let tree = session.expression(arg(args, 0, "#")?)?;
            let removed = session.library.remove(&tree)?;
            log::info!("Removed {} entries of {}", removed, tree);
            Ok(())
        }
        other => bail!("unknown command: {}", other),
    }
}
