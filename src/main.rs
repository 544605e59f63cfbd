use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quickstart_util::{
    commands::{fs::*, git::*, svn::*},
    core::{app::App, config::Config, error::{AppError, AppResult}, path::ChangeDirectory, process::RunMode, svn::Credentials},
};


#[derive(Parser, Debug)]
#[command(name = "qsu", version, about = "Quick helpers around svn, git, file copy and zip")]
struct Cli {
    /// svn executable
    #[arg(long, global = true, default_value = "svn")]
    svn: String,

    /// git executable
    #[arg(long, global = true, default_value = "git")]
    git: String,

    /// Fallback encoding for tool output (repeatable, e.g. gbk)
    #[arg(long = "encoding", global = true)]
    encodings: Vec<String>,

    /// Directory for temporary exclude/externals files
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true)]
    chdir: Option<PathBuf>,

    #[arg(long, global = true)]
    username: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    /// Let svn/git/copy tools write straight to the console instead of capturing
    #[arg(long, global = true, default_value_t = false)]
    stream: bool,

    /// -v: log commands, -vv: also log their output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Subversion helpers.
    Svn {
        #[command(subcommand)]
        command: SvnCommands,
    },
    /// Git helpers.
    Git {
        #[command(subcommand)]
        command: GitCommands,
    },
    /// File system helpers.
    Fs {
        #[command(subcommand)]
        command: FsCommands,
    },
    /// Compress a file or a directory tree.
    /// Usage: zip <source> <archive>
    Zip {
        source: PathBuf,
        archive: PathBuf,
    },
    /// Extract an archive, recreating its directory structure.
    /// Usage: unzip <archive> <destination>
    Unzip {
        archive: PathBuf,
        destination: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum SvnCommands {
    /// Show info of a working copy path or URL.
    Info {
        #[arg(default_value = ".")]
        target: String,
        #[arg(short, long)]
        revision: Option<String>,
    },
    /// Show history. Revisions as "100", "HEAD" or "100:90".
    Log {
        #[arg(default_value = ".")]
        target: String,
        #[arg(short, long)]
        revision: Option<String>,
        #[arg(short, long)]
        limit: Option<u32>,
        /// Show changed paths
        #[arg(long, default_value_t = false)]
        paths: bool,
        /// Glob over author, date, message and paths
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Update the working copy, checking it out first if needed.
    /// Usage: checkout <url> <path> [--revision <rev>]
    Checkout {
        url: String,
        path: PathBuf,
        #[arg(short, long)]
        revision: Option<String>,
    },
    Update {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(short, long)]
        revision: Option<String>,
    },
    Status {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Add and commit paths.
    /// Usage: commit [paths...] [--message <message>]
    Commit {
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        message: Option<String>,
    },
    Lock {
        path: String,
        #[arg(short, long)]
        message: String,
    },
    Unlock {
        path: String,
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Copy <source> to a new <destination> branch.
    Branch {
        source: String,
        destination: String,
        #[arg(short, long)]
        message: String,
    },
    /// Undo the changes of a revision ("100") or a range ("100:90") in the working copy.
    Rollback {
        revision: String,
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Revert everything and delete unversioned files.
    Clear {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// Set svn:externals from SOURCE=TARGET pairs.
    Externals {
        dir: PathBuf,
        #[arg(required = true)]
        definitions: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum GitCommands {
    /// Print the current branch and commit.
    Head {
        #[arg(default_value = ".")]
        repo: PathBuf,
    },
    /// Clone or refresh <path> to a clean <branch>.
    GetClean {
        url: String,
        path: PathBuf,
        #[arg(short, long, default_value = "master")]
        branch: String,
        #[arg(short, long)]
        revision: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum FsCommands {
    Remove {
        path: PathBuf,
    },
    Copy {
        source: PathBuf,
        destination: PathBuf,
        #[arg(short, long = "exclude")]
        excludes: Vec<String>,
    },
    Mkdir {
        path: PathBuf,
        /// Fail if the path already exists
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> AppResult<Config> {
    let labels: Vec<&str> = cli.encodings.iter().map(String::as_str).collect();
    let mut config = Config::new()
        .with_svn_program(&cli.svn)
        .with_git_program(&cli.git)
        .with_run_mode(if cli.stream { RunMode::Inherit } else { RunMode::Capture })
        .with_label("qsu")
        .with_encoding_labels(&labels)?;
    if let Some(dir) = &cli.temp_dir {
        config = config.with_temp_dir(dir);
    }
    Ok(config)
}

fn run(app: &App, command: Commands) -> AppResult<()> {
    match command {
        Commands::Svn { command } => match command {
            SvnCommands::Info { target, revision } => handle_info(app, &target, revision.as_deref()),
            SvnCommands::Log { target, revision, limit, paths, search } => handle_log(app, &target, revision.as_deref(), limit, paths, search.as_deref()),
            SvnCommands::Checkout { url, path, revision } => handle_checkout(app, &url, &path, revision.as_deref()),
            SvnCommands::Update { path, revision } => handle_update(app, &path, revision.as_deref()),
            SvnCommands::Status { path } => handle_status(app, &path),
            SvnCommands::Commit { paths, message } => handle_commit(app, &paths, message.as_deref()),
            SvnCommands::Lock { path, message } => handle_lock(app, &path, &message),
            SvnCommands::Unlock { path, force } => handle_unlock(app, &path, force),
            SvnCommands::Branch { source, destination, message } => handle_branch(app, &source, &destination, &message),
            SvnCommands::Rollback { revision, path } => handle_rollback(app, &path, &revision),
            SvnCommands::Clear { path, yes } => handle_clear(app, &path, yes),
            SvnCommands::Externals { dir, definitions } => handle_externals(app, &dir, &definitions),
        },
        Commands::Git { command } => match command {
            GitCommands::Head { repo } => handle_head(app, &repo),
            GitCommands::GetClean { url, path, branch, revision } => handle_get_clean(app, &url, &path, &branch, revision.as_deref()),
        },
        Commands::Fs { command } => match command {
            FsCommands::Remove { path } => handle_remove(app, &path),
            FsCommands::Copy { source, destination, excludes } => handle_copy(app, &source, &destination, &excludes),
            FsCommands::Mkdir { path, strict } => handle_mkdir(app, &path, strict),
        },
        Commands::Zip { source, archive } => handle_zip(app, &source, &archive),
        Commands::Unzip { archive, destination } => handle_unzip(app, &archive, &destination),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            let _ = e.print();
            std::process::exit(e.exit_code());
        }
    };

    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let credentials = if cli.username.is_some() || cli.password.is_some() {
        Some(Credentials { username: cli.username.clone(), password: cli.password.clone() })
    } else {
        None
    };

    let app = App::new(config, credentials);
    let code = run_with_app(&app, cli.chdir.as_deref(), cli.command);
    // 先释放 App，恢复光标
    drop(app);
    std::process::exit(code);
}

fn run_with_app(app: &App, chdir: Option<&std::path::Path>, command: Commands) -> i32 {
    let _cwd = match chdir.map(ChangeDirectory::enter).transpose() {
        Ok(guard) => guard,
        Err(e) => {
            app.ui.error(&format!("{}", e));
            return 1;
        }
    };

    match run(app, command) {
        Ok(()) => 0,
        Err(AppError::OperationCancelled) => {
            app.ui.success("Operation cancelled by user.");
            0
        }
        Err(e) => {
            app.ui.error(&format!("{}", e));
            if let AppError::Exec { output, .. } = &e {
                if !output.is_empty() {
                    eprintln!("{}", output);
                }
            }
            e.exit_code().unwrap_or(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_flag_selects_inherit_mode() {
        let cli = Cli::try_parse_from(["qsu", "svn", "status"]).unwrap();
        assert_eq!(build_config(&cli).unwrap().run_mode, RunMode::Capture);

        let cli = Cli::try_parse_from(["qsu", "--stream", "svn", "status"]).unwrap();
        assert_eq!(build_config(&cli).unwrap().run_mode, RunMode::Inherit);
    }
}
