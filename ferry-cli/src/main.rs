//! The `ferry` build tool.
//!
//! ```text
//! ferry build ./mathlib-worker --output ./dist
//! ferry list ./dist/mathlib-worker
//! ferry run ./dist/mathlib-worker sum '{"a": 1, "b": 2}'
//! ferry gen ./mathlib-worker -o ./dist --client src/mathlib_client.rs
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use ferry_client::{Client, ClientError};
use ferry_gen::{Generator, Introspection};
use ferry_types::ArgMap;

#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(about = "Build and call bridge workers, and generate typed clients", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a worker crate into a standalone executable
    Build {
        /// Path to the worker crate directory
        module: PathBuf,
        /// Output directory for the built binary
        #[arg(short, long, default_value = "./dist")]
        output: PathBuf,
        /// Executable name (default: crate directory name)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List the functions a worker binary exports
    List {
        /// Path to the worker binary
        binary: PathBuf,
    },
    /// Call one function in a worker binary
    Run {
        /// Path to the worker binary
        binary: PathBuf,
        /// Function name
        function: String,
        /// JSON object of arguments
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Build, introspect, and generate a typed client in one pass
    Gen {
        /// Path to the worker crate directory
        #[arg(default_value = ".")]
        module: PathBuf,
        /// Output directory for the built binary
        #[arg(short, long, default_value = "./dist")]
        output: PathBuf,
        /// Path of the generated client source file
        #[arg(long, default_value = "ferry_client_gen.rs")]
        client: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Build {
            module,
            output,
            name,
        } => {
            build(&module, &output, name.as_deref()).await?;
        }
        Commands::List { binary } => list(&binary).await?,
        Commands::Run {
            binary,
            function,
            args,
        } => run(&binary, &function, &args).await?,
        Commands::Gen {
            module,
            output,
            client,
        } => r#gen(&module, &output, &client).await?,
    }
    Ok(())
}

/// Compile the worker crate in release mode and copy the binary into the
/// output directory. Returns the installed binary path.
async fn build(module: &Path, output: &Path, name: Option<&str>) -> Result<PathBuf> {
    if !module.is_dir() {
        bail!("{} is not a directory", module.display());
    }
    let crate_name = match name {
        Some(name) => name.to_string(),
        None => module
            .canonicalize()
            .with_context(|| format!("resolving {}", module.display()))?
            .file_name()
            .and_then(|n| n.to_str())
            .map(ToString::to_string)
            .context("worker crate directory has no usable name")?,
    };

    println!("Building {crate_name} from {}...", module.display());
    let status = tokio::process::Command::new("cargo")
        .arg("build")
        .arg("--release")
        .current_dir(module)
        .status()
        .await
        .context("running cargo build")?;
    if !status.success() {
        bail!("build failed");
    }

    let built = module.join("target/release").join(&crate_name);
    if !built.is_file() {
        bail!(
            "expected binary at {}; pass --name if the crate's binary name differs",
            built.display()
        );
    }

    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("creating {}", output.display()))?;
    let installed = output.join(&crate_name);
    tokio::fs::copy(&built, &installed)
        .await
        .with_context(|| format!("installing {}", installed.display()))?;
    debug!(binary = %installed.display(), "installed worker binary");

    println!("\n✓ Built: {}", installed.display());
    println!("\nTest it:");
    println!(
        "  echo '{{\"function\":\"__introspect__\",\"args\":{{}}}}' | {}",
        installed.display()
    );
    println!("\nGenerate a typed client:");
    println!(
        "  ferry gen {} --client {crate_name}_client.rs",
        module.display()
    );
    Ok(installed)
}

/// Print every exported function as `name(param: type, ...) -> ret`.
async fn list(binary: &Path) -> Result<()> {
    let introspection = introspect(binary).await?;
    println!("Exported functions:\n");
    for function in &introspection.functions {
        if function.name.starts_with('_') {
            continue;
        }
        let params: Vec<String> = function
            .parameters
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        println!(
            "  {}({}) -> {}",
            function.name,
            params.join(", "),
            function.return_type
        );
    }
    Ok(())
}

/// Perform one ad-hoc call and print the result value.
async fn run(binary: &Path, function: &str, args: &str) -> Result<()> {
    let args: ArgMap = serde_json::from_str(args).context("arguments must be a JSON object")?;
    match Client::new(binary).call_raw(function, args).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err @ (ClientError::WorkerCrash { .. }
        | ClientError::InvalidInput { .. }
        | ClientError::UserCode { .. })) => {
            // Mirror the worker's own verdict in our exit code.
            eprintln!("{err}");
            let code = if matches!(err, ClientError::WorkerCrash { .. }) {
                2
            } else {
                1
            };
            std::process::exit(code);
        }
        Err(err) => Err(err.into()),
    }
}

/// Build the worker, introspect it, and write one generated source file.
async fn r#gen(module: &Path, output: &Path, client: &Path) -> Result<()> {
    let binary = build(module, output, None).await?;
    let introspection = introspect(&binary).await?;

    let module_name = binary
        .file_name()
        .and_then(|n| n.to_str())
        .context("binary path has no usable name")?;
    let source = Generator::new(module_name, binary.display().to_string()).generate(&introspection);

    if let Some(parent) = client.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(client, source)
        .await
        .with_context(|| format!("writing {}", client.display()))?;

    let count = introspection
        .functions
        .iter()
        .filter(|f| !f.name.starts_with('_'))
        .count();
    println!("Generated {} with {count} functions", client.display());
    Ok(())
}

async fn introspect(binary: &Path) -> Result<Introspection> {
    let value = Client::new(binary)
        .introspect()
        .await
        .with_context(|| format!("introspecting {}", binary.display()))?;
    Introspection::from_value(value).context("worker returned a malformed introspection payload")
}
