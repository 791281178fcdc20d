#[macro_use]
extern crate log;

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process;

use chrono::Local;
use env_logger::Builder;
use failure::{Error, ResultExt};
use log::LevelFilter;
use structopt::StructOpt;
use trypod_remote::model::{Credentials, Hook, HookRequest, Perm, Repo, Scm, User};
use trypod_remote::{Config, Registry, Remote};

fn main() {
    let args = Args::from_args();

    if args.example_config {
        if let Err(e) = generate_example() {
            report(&e);
            process::exit(1);
        }
        return;
    }

    if let Err(e) = run(&args) {
        report(&e);
        process::exit(1);
    }
}

fn report(e: &Error) {
    eprintln!("Error: {}", e);

    for cause in e.iter_causes() {
        eprintln!("\tCaused By: {}", cause);
    }
}

fn generate_example() -> Result<(), Error> {
    println!("{}", Config::example().as_toml()?);
    Ok(())
}

fn run(args: &Args) -> Result<(), Error> {
    initialize_logging(args)?;
    let cfg = args.config()?;

    if log_enabled!(log::Level::Debug) {
        for line in format!("{:#?}", cfg).lines() {
            debug!("{}", line);
        }
    }

    let mut registry = Registry::new();
    if !trypod_remote::register(cfg, &mut registry)? {
        failure::bail!("No remotes are configured");
    }

    let remote = registry
        .lookup(trypod_remote::trypod::KIND)
        .ok_or_else(|| failure::err_msg("The Trypod remote wasn't registered"))?;

    args.cmd.execute(remote)
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
struct Args {
    #[structopt(
        short = "c",
        long = "config",
        default_value = "~/.trypod-remote.toml",
        help = "The configuration file to use."
    )]
    config_file: String,
    #[structopt(
        short = "v",
        long = "verbose",
        parse(from_occurrences),
        help = "Verbose output (repeat for more verbosity)"
    )]
    verbosity: u64,
    #[structopt(
        long = "example-config",
        help = "Generate an example config and immediately exit."
    )]
    example_config: bool,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Args {
    pub fn config(&self) -> Result<Config, Error> {
        let config_file =
            shellexpand::full(&self.config_file).context("Unable to expand wildcards")?;

        let mut cfg = Config::from_file(&*config_file).context("Couldn't load the config")?;
        cfg.apply_overrides(|key| env::var(key).ok())?;

        Ok(cfg)
    }
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
enum Command {
    #[structopt(name = "info", about = "Show how the remote is configured")]
    Info,
    #[structopt(
        name = "login",
        about = "Log in (the password is read from $TRYPOD_PASSWORD)"
    )]
    Login {
        #[structopt(short = "u", long = "username")]
        username: String,
    },
    #[structopt(name = "repos", about = "List the repositories a user can build")]
    Repos {
        #[structopt(long = "user-id", default_value = "0")]
        user_id: i64,
    },
    #[structopt(name = "script", about = "Print the build script for a revision")]
    Script {
        #[structopt(help = "The repository's URL")]
        repo_url: String,
        #[structopt(help = "The revision to fetch the script from")]
        rev: String,
    },
    #[structopt(name = "parse-hook", about = "Parse a webhook body")]
    ParseHook {
        #[structopt(help = "A file containing the hook body (defaults to stdin)")]
        file: Option<String>,
    },
}

impl Command {
    fn execute(&self, remote: &dyn Remote) -> Result<(), Error> {
        match *self {
            Command::Info => {
                println!("kind: {}", remote.kind());
                println!("host: {}", remote.host());
                println!("open registration: {}", remote.open_registration());
            }
            Command::Login { ref username } => {
                let password = env::var("TRYPOD_PASSWORD")
                    .context("The password must be provided via $TRYPOD_PASSWORD")?;
                let login = remote.authorize(&Credentials::new(username.as_str(), password))?;
                print_json(&login)?;
            }
            Command::Repos { user_id } => {
                let user = User {
                    id: user_id,
                    login: String::new(),
                };
                print_json(&remote.repositories(&user)?)?;
            }
            Command::Script {
                ref repo_url,
                ref rev,
            } => {
                let script = remote.build_script(
                    &User::default(),
                    &placeholder_repo(remote, repo_url),
                    &placeholder_hook(rev),
                )?;
                io::stdout().write_all(&script)?;
            }
            Command::ParseHook { ref file } => {
                let hook = match *file {
                    Some(ref path) => {
                        let f = File::open(path)
                            .with_context(|_| format!("Unable to open {}", path))?;
                        remote.parse_hook(HookRequest::new(f))?
                    }
                    None => remote.parse_hook(HookRequest::new(io::stdin()))?,
                };
                print_json(&hook)?;
            }
        }

        Ok(())
    }
}

fn placeholder_repo(remote: &dyn Remote, url: &str) -> Repo {
    Repo {
        user_id: 0,
        remote: remote.kind().to_string(),
        host: remote.host(),
        owner: String::new(),
        name: url.rsplit('/').next().unwrap_or_default().to_string(),
        scm: Scm::Mercurial,
        private: false,
        clone_url: url.to_string(),
        git_url: url.to_string(),
        ssh_url: url.to_string(),
        url: url.to_string(),
        role: Perm::full(),
    }
}

fn placeholder_hook(rev: &str) -> Hook {
    Hook {
        owner: String::new(),
        repo: String::new(),
        sha: rev.to_string(),
        branch: String::new(),
        author: String::new(),
        timestamp: chrono::Utc::now(),
        message: String::new(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn initialize_logging(args: &Args) -> Result<(), Error> {
    let mut builder = Builder::new();

    let level = match args.verbosity {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };

    if let Some(lvl) = level {
        builder.filter(Some("trypod_remote"), lvl);
    }

    if let Ok(filter) = env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }

    builder.format(|out, record| match record.line() {
        Some(line) => writeln!(
            out,
            "{} [{:5}] ({}#{}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            line,
            record.args()
        ),
        None => writeln!(
            out,
            "{} [{:5}] ({}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        ),
    });

    builder.try_init()?;

    Ok(())
}
