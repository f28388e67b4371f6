//! minigit CLI - minimal version control command line interface

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use minigit::ops::{add, branches, commit, diff, fsck, log, rm, status};
use minigit::{read_blob, read_commit, resolve_rev, Error, Hash, Repo};

#[derive(Parser)]
#[command(name = "minigit")]
#[command(about = "minimal content-addressed version control")]
#[command(version)]
struct Cli {
    /// run as if started in this directory
    #[arg(short = 'C', long = "dir", default_value = ".", env = "MINIGIT_DIR")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init,

    /// stage a file for the next commit
    Add {
        /// file to stage
        path: PathBuf,
    },

    /// stage the removal of a file
    Rm {
        /// file to unstage or stop tracking
        path: PathBuf,
    },

    /// record staged changes as a new commit
    Commit {
        /// commit message
        message: String,
    },

    /// show commit history
    Log {
        /// revision to start from
        #[arg(default_value = "HEAD")]
        rev: String,

        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// show staged, modified and untracked files
    Status,

    /// list branches
    Branch,

    /// show differences between two revisions
    Diff {
        /// first revision
        rev1: String,

        /// second revision
        #[arg(default_value = "HEAD")]
        rev2: String,
    },

    /// show a commit
    Show {
        /// branch, hash or hash prefix
        #[arg(default_value = "HEAD")]
        rev: String,
    },

    /// show contents of an object
    CatFile {
        /// object type (blob, commit)
        object_type: String,

        /// object hash
        object: String,
    },

    /// verify repository integrity
    Fsck,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> minigit::Result<()> {
    match cli.command {
        Commands::Init => {
            let repo = Repo::init(&cli.dir)?;
            println!(
                "initialized empty minigit repository in {}",
                repo.path().display()
            );
        }

        Commands::Add { path } => {
            let repo = Repo::discover(&cli.dir)?;
            let _lock = repo.lock()?;
            add(&repo, &user_path(&cli.dir, &path)?)?;
        }

        Commands::Rm { path } => {
            let repo = Repo::discover(&cli.dir)?;
            let _lock = repo.lock()?;
            rm(&repo, &user_path(&cli.dir, &path)?)?;
        }

        Commands::Commit { message } => {
            let repo = Repo::discover(&cli.dir)?;
            let _lock = repo.lock()?;
            let hash = commit(&repo, &message)?;
            println!("{}", hash);
        }

        Commands::Log { rev, max_count } => {
            let repo = Repo::discover(&cli.dir)?;
            let entries = log(&repo, &rev, max_count)?;

            for entry in entries {
                println!("{}", entry);
            }
        }

        Commands::Status => {
            let repo = Repo::discover(&cli.dir)?;
            print!("{}", status(&repo)?);
        }

        Commands::Branch => {
            let repo = Repo::discover(&cli.dir)?;
            for branch in branches(&repo)? {
                println!("{}", branch);
            }
        }

        Commands::Diff { rev1, rev2 } => {
            let repo = Repo::discover(&cli.dir)?;
            for change in diff(&repo, &rev1, &rev2)? {
                println!("{}", change);
            }
        }

        Commands::Show { rev } => {
            let repo = Repo::discover(&cli.dir)?;
            let hash = resolve_rev(&repo, &rev)?;
            print_commit(&repo, &hash)?;
        }

        Commands::CatFile {
            object_type,
            object,
        } => {
            let repo = Repo::discover(&cli.dir)?;
            let hash = resolve_rev(&repo, &object)?;

            match object_type.as_str() {
                "blob" => {
                    let data = read_blob(&repo, &hash)?;
                    io::stdout().write_all(&data).map_err(|e| Error::Io {
                        path: "stdout".into(),
                        source: e,
                    })?;
                }
                "commit" => print_commit(&repo, &hash)?,
                _ => {
                    return Err(Error::InvalidArguments(format!(
                        "unknown object type: {}",
                        object_type
                    )));
                }
            }
        }

        Commands::Fsck => {
            let repo = Repo::discover(&cli.dir)?;
            let report = fsck(&repo)?;

            println!("objects checked: {}", report.objects_checked);

            if !report.corrupt_objects.is_empty() {
                println!("\ncorrupt objects:");
                for obj in &report.corrupt_objects {
                    println!("  {} {}: {}", obj.kind, obj.hash, obj.message);
                }
            }

            if !report.missing_objects.is_empty() {
                println!("\nmissing objects:");
                for obj in &report.missing_objects {
                    println!(
                        "  {} {} (referenced by {})",
                        obj.kind, obj.hash, obj.referenced_by
                    );
                }
            }

            if !report.dangling_objects.is_empty() {
                println!("\ndangling objects: {}", report.dangling_objects.len());
            }

            if report.is_ok() {
                println!("\nrepository is healthy");
            } else {
                return Err(Error::CorruptObjectMessage(
                    "repository integrity check failed".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// resolve a path argument against the directory the command runs in
fn user_path(dir: &Path, path: &Path) -> minigit::Result<PathBuf> {
    let joined = dir.join(path);
    std::path::absolute(&joined).map_err(|e| Error::Io {
        path: joined,
        source: e,
    })
}

fn print_commit(repo: &Repo, hash: &Hash) -> minigit::Result<()> {
    let commit = read_commit(repo, hash)?;

    println!("commit {}", hash);
    if let Some(parent) = &commit.parent {
        println!("parent {}", parent);
    }
    println!("date {}", minigit::ops::format_timestamp(commit.timestamp));
    println!();
    for line in commit.message.lines() {
        println!("    {}", line);
    }
    println!();
    for (path, blob) in &commit.files {
        println!("{} {}", blob, path);
    }

    Ok(())
}
