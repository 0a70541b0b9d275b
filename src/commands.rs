//! High-level command orchestration for the CLI.
//!
//! This module contains the handler functions for each CLI command (`init`, `add`, `use`, etc.).
//! It serves as the coordination layer, interacting with:
//! - `crate::ui` for user interaction (output, prompts).
//! - `crate::paths` for filesystem locations.
//! - `crate::config` and `crate::ssh_config` for the two files gh-switch owns.
//! - `crate::switch` for the state transitions that touch both.
//! - `crate::system` for git, ssh and ssh-keygen.
//!
//! Missing arguments are prompted for with `inquire` when stdin is a terminal;
//! otherwise they are required on the command line.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use inquire::validator::Validation;
use inquire::{Confirm, Select, Text};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{ConfigDocument, ConfigStore};
use crate::doctor::run_doctor;
use crate::error::Error;
use crate::git_url::{repo_dir_name, rewrite_git_url};
use crate::keys::{default_key, detect_ssh_keys, fix_key_permissions, key_permissions_ok, read_public_key};
use crate::paths::Paths;
use crate::profiles::{
    Profile, key_file_name, validate_email, validate_git_name, validate_github_username,
    validate_key_path, validate_profile_name,
};
use crate::ssh_config::SshConfigFile;
use crate::switch::{register_profile, unregister_profile, use_profile as activate};
use crate::system::{SSH_PROBE_TIMEOUT, System};
use crate::ui::Ui;

/// Profile fields accepted on the command line by `init` and `add`
#[derive(Debug, Default, Clone, clap::Args)]
pub struct AddArgs {
    /// Profile name (letters, numbers, hyphens, underscores)
    #[arg(long)]
    pub name: Option<String>,

    /// git user.name for this profile
    #[arg(long)]
    pub git_name: Option<String>,

    /// git user.email for this profile
    #[arg(long)]
    pub email: Option<String>,

    /// GitHub username
    #[arg(long)]
    pub github_user: Option<String>,

    /// Path to an existing SSH private key
    #[arg(long, value_name = "PATH", conflicts_with = "generate_key")]
    pub key: Option<String>,

    /// Generate a new ed25519 key at ~/.ssh/id_ed25519_<name>
    #[arg(long)]
    pub generate_key: bool,

    /// Replace an existing profile with the same name
    #[arg(long)]
    pub force: bool,
}

fn interactive() -> bool {
    std::io::stdin().is_terminal()
}

fn store(paths: &Paths) -> ConfigStore {
    ConfigStore::new(&paths.config_file)
}

fn ssh_file(paths: &Paths) -> SshConfigFile {
    SshConfigFile::new(&paths.ssh_config)
}

fn require_git(system: &dyn System) -> Result<()> {
    if !system.git_available() {
        bail!("Git is not installed or not on PATH.\nHint: Install git and try again.");
    }
    Ok(())
}

fn print_no_profiles(ui: &Ui) {
    ui.warn("No profiles configured yet.");
    ui.hint("Run 'gh-switch init' to add your first profile.");
}

/// Use `value` if given, otherwise prompt for it.
///
/// Both paths run `validate`; a flag value that fails is reported as the
/// validation error itself.
fn resolve_field(
    value: Option<String>,
    flag: &str,
    message: &str,
    default: Option<&str>,
    validate: fn(&str) -> crate::error::Result<()>,
) -> Result<String> {
    if let Some(value) = value {
        validate(&value)?;
        return Ok(value.trim().to_string());
    }

    if !interactive() {
        bail!("Missing value for {flag}.\nHint: Pass {flag} <value> when not running in a terminal.");
    }

    let mut prompt = Text::new(message).with_validator(move |input: &str| {
        Ok(match validate(input) {
            Ok(()) => Validation::Valid,
            Err(e) => Validation::Invalid(first_line(&e.to_string()).into()),
        })
    });
    if let Some(default) = default.filter(|d| !d.is_empty()) {
        prompt = prompt.with_default(default);
    }

    let answer = prompt.prompt().context("Input cancelled")?;
    Ok(answer.trim().to_string())
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}

/// Interactive profile picker; returns the chosen profile name
fn select_profile(doc: &ConfigDocument, message: &str) -> Result<String> {
    let labels: Vec<String> = doc.profiles.iter().map(Profile::label).collect();
    let start = doc
        .active_profile
        .as_deref()
        .and_then(|active| doc.profiles.iter().position(|p| p.name == active))
        .unwrap_or(0);

    let choice = Select::new(message, labels)
        .with_starting_cursor(start)
        .raw_prompt()
        .context("Selection cancelled")?;
    Ok(doc.profiles[choice.index].name.clone())
}

/// Profile named on the command line, or picked interactively
fn resolve_profile_name(
    doc: &ConfigDocument,
    name: Option<&str>,
    message: &str,
) -> Result<Option<String>> {
    if let Some(name) = name {
        return Ok(Some(name.to_string()));
    }
    if doc.profiles.is_empty() {
        return Ok(None);
    }
    if !interactive() {
        bail!("No profile given.\nHint: Pass the profile name, see 'gh-switch list'.");
    }
    select_profile(doc, message).map(Some)
}

// -----------------------------------------------------------------------------
// init / add
// -----------------------------------------------------------------------------

/// First-run wizard: adds the first profile
pub fn init(paths: &Paths, system: &dyn System, ui: &Ui, args: AddArgs) -> Result<()> {
    require_git(system)?;

    let doc = store(paths).load()?;
    if !doc.profiles.is_empty() {
        ui.warn("gh-switch is already initialized.");
        ui.println(format!("You have {} profile(s) configured.", doc.profiles.len()));
        ui.hint("Use 'gh-switch add' to add more profiles, or 'gh-switch list' to see them.");
        return Ok(());
    }

    ui.section("Welcome to gh-switch!");
    ui.println("This wizard sets up your first GitHub account profile.");
    ui.newline();

    add_profile(paths, system, ui, args, Some("personal"))
}

/// Add a new profile
pub fn add(paths: &Paths, system: &dyn System, ui: &Ui, args: AddArgs) -> Result<()> {
    require_git(system)?;
    add_profile(paths, system, ui, args, None)
}

fn add_profile(
    paths: &Paths,
    system: &dyn System,
    ui: &Ui,
    args: AddArgs,
    default_name: Option<&str>,
) -> Result<()> {
    paths.ensure_dirs()?;
    let store = store(paths);
    let doc = store.load()?;

    let identity = system.global_identity().unwrap_or_default();
    let detected_keys = detect_ssh_keys(&paths.ssh_dir);

    if identity.is_set() {
        ui.info("Detected existing git configuration:");
        ui.field("Name", &identity.name);
        ui.field("Email", &identity.email);
    }
    if !detected_keys.is_empty() {
        ui.info(format!(
            "Found {} SSH key(s) in {}",
            detected_keys.len(),
            paths.ssh_dir.display()
        ));
    }

    let name = resolve_field(
        args.name,
        "--name",
        "Profile name (e.g. personal, work):",
        default_name,
        validate_profile_name,
    )?;

    if doc.contains(&name) && !args.force {
        bail!(
            "Profile '{}' already exists.\nHint: Pass --force to replace it, or choose a different name.",
            name
        );
    }

    let default_identity = identity.is_set();
    let git_name = resolve_field(
        args.git_name,
        "--git-name",
        "Git user name:",
        default_identity.then_some(identity.name.as_str()),
        validate_git_name,
    )?;
    let git_email = resolve_field(
        args.email,
        "--email",
        "Git user email:",
        default_identity.then_some(identity.email.as_str()),
        validate_email,
    )?;
    let github_user = resolve_field(
        args.github_user,
        "--github-user",
        "GitHub username:",
        None,
        validate_github_username,
    )?;

    let mut generated = args.generate_key;
    let mut key_path = if args.generate_key {
        generate_profile_key(paths, system, ui, &name, &git_email)?
    } else {
        match args.key {
            Some(key) => paths.resolve_path(&key)?,
            None => match prompt_key(paths, &detected_keys)? {
                KeyChoice::Existing(path) => path,
                KeyChoice::Generate => {
                    generated = true;
                    generate_profile_key(paths, system, ui, &name, &git_email)?
                }
            },
        }
    };
    validate_key_path(&key_path)?;

    if !generated && let Some(other) = doc.find_by_key_path(&key_path, Some(name.as_str())) {
        ui.warn(format!(
            "This SSH key is already used by the '{}' profile.",
            other.name
        ));
        ui.println("GitHub does not allow the same SSH key on multiple accounts.");

        if interactive() {
            let generate = Confirm::new("Generate a new SSH key for this profile?")
                .with_default(true)
                .prompt()
                .context("Confirmation cancelled")?;
            if !generate {
                bail!(
                    "Cannot continue with a key that belongs to another profile.\nHint: Choose a different key or pass --generate-key."
                );
            }
            key_path = generate_profile_key(paths, system, ui, &name, &git_email)?;
        }
    }

    if !key_permissions_ok(&key_path) {
        fix_key_permissions(&key_path)?;
        ui.info(format!("Set permissions of {} to 600", key_path.display()));
    }

    let profile = Profile::new(&name, &git_name, &git_email, &github_user, key_path)?;
    let registration = register_profile(&store, &ssh_file(paths), profile.clone())?;

    ui.newline();
    if registration.replaced {
        ui.ok(format!("Updated profile '{}'", profile.name));
    } else {
        ui.ok(format!("Added profile '{}'", profile.name));
    }
    ui.field("GitHub", &profile.github_username);
    ui.field("Email", &profile.git_email);
    ui.field("SSH Host", &profile.ssh_host);
    ui.field("SSH Key", profile.ssh_key_path.display().to_string());
    if registration.active {
        ui.field("Status", ui.colored("active", AnsiColor::Green));
    }

    ui.newline();
    ui.println("Next steps:");
    ui.println(format!("  1. Test the connection: {}", ui.bold(format!("gh-switch verify {}", profile.name))));
    ui.println(format!("  2. Switch to this profile: {}", ui.bold(format!("gh-switch use {}", profile.name))));
    ui.println(format!("  3. Clone a repo: {}", ui.bold(format!("gh-switch clone <url> {}", profile.name))));

    Ok(())
}

enum KeyChoice {
    Existing(PathBuf),
    Generate,
}

const CUSTOM_KEY: &str = "Enter custom path...";
const GENERATE_KEY: &str = "Generate a new key";

fn prompt_key(paths: &Paths, detected: &[crate::keys::DetectedKey]) -> Result<KeyChoice> {
    if !interactive() {
        bail!("Missing SSH key.\nHint: Pass --key <path> or --generate-key when not running in a terminal.");
    }

    if !detected.is_empty() {
        let mut options: Vec<String> = detected
            .iter()
            .map(|k| {
                if k.has_public_key {
                    format!("{} ✓ (has .pub)", k.name)
                } else {
                    k.name.clone()
                }
            })
            .collect();
        options.push(CUSTOM_KEY.to_string());
        options.push(GENERATE_KEY.to_string());

        let start = default_key(detected)
            .and_then(|d| detected.iter().position(|k| k.path == d.path))
            .unwrap_or(0);

        let choice = Select::new("Select SSH private key:", options)
            .with_starting_cursor(start)
            .raw_prompt()
            .context("Selection cancelled")?;

        if choice.index < detected.len() {
            return Ok(KeyChoice::Existing(detected[choice.index].path.clone()));
        }
        if choice.value == GENERATE_KEY {
            return Ok(KeyChoice::Generate);
        }
    }

    let home = paths.home.clone();
    let answer = Text::new("Path to SSH private key:")
        .with_default("~/.ssh/id_ed25519")
        .with_validator(move |input: &str| {
            Ok(match Paths::from_home(&home).resolve_path(input) {
                Ok(path) if path.is_file() => Validation::Valid,
                Ok(path) => {
                    Validation::Invalid(format!("SSH key not found at {}", path.display()).into())
                }
                Err(e) => Validation::Invalid(e.to_string().into()),
            })
        })
        .prompt()
        .context("Input cancelled")?;

    Ok(KeyChoice::Existing(paths.resolve_path(&answer)?))
}

/// Generate `~/.ssh/id_ed25519_<slug>` and print its public half
fn generate_profile_key(
    paths: &Paths,
    system: &dyn System,
    ui: &Ui,
    name: &str,
    email: &str,
) -> Result<PathBuf> {
    let path = paths.ssh_dir.join(key_file_name(name));
    if path.exists() {
        return Err(Error::validation(
            format!("SSH key already exists at {}", path.display()),
            "Pass it with --key, or move it aside before generating a new one.",
        )
        .into());
    }

    let spinner = ui.spinner("Generating SSH key...");
    if let Err(e) = system.generate_key(email, &path) {
        ui.spinner_finish_err(&spinner, "Failed to generate SSH key");
        return Err(e.into());
    }
    ui.spinner_finish_ok(&spinner, format!("Generated {}", path.display()));

    if let Some(public) = read_public_key(&path) {
        ui.newline();
        ui.println("Add this public key to GitHub (Settings → SSH and GPG keys → New SSH key):");
        ui.rule();
        ui.println(public);
        ui.rule();
        ui.newline();
    }

    Ok(path)
}

// -----------------------------------------------------------------------------
// list / current / config
// -----------------------------------------------------------------------------

/// List all configured profiles
pub fn list(paths: &Paths, ui: &Ui) -> Result<()> {
    let doc = store(paths).load()?;

    if doc.profiles.is_empty() {
        print_no_profiles(ui);
        return Ok(());
    }

    let mut table = ui.table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("Profile"),
        ui.header_cell("GitHub"),
        ui.header_cell("Email"),
        ui.header_cell("SSH Host"),
    ]);

    let active = doc.active_profile.as_deref();
    for profile in &doc.profiles {
        let is_active = Some(profile.name.as_str()) == active;
        let (marker, name_cell) = if is_active {
            (
                ui.colored_cell(ui.icon_active(), comfy_table::Color::Green),
                ui.colored_cell(&profile.name, comfy_table::Color::Green),
            )
        } else {
            (ui.cell(""), ui.cell(&profile.name))
        };
        table.add_row(vec![
            marker,
            name_cell,
            ui.cell(&profile.github_username),
            ui.cell(&profile.git_email),
            ui.cell(&profile.ssh_host),
        ]);
    }

    ui.section(format!("GitHub Account Profiles ({})", doc.profiles.len()));
    ui.println(table.to_string());

    match active {
        Some(name) => ui.println(format!("Currently active: {}", ui.bold(name))),
        None => ui.hint("No active profile. Use 'gh-switch use <profile>' to activate one."),
    }

    Ok(())
}

/// Show the active profile next to the global git identity
pub fn current(paths: &Paths, system: &dyn System, ui: &Ui) -> Result<()> {
    require_git(system)?;

    let doc = store(paths).load()?;
    let identity = system.global_identity()?;

    ui.section("Current Configuration");
    ui.newline();

    match doc.active() {
        Some(profile) => {
            ui.println("Active Profile:");
            ui.field("Name", ui.colored(&profile.name, AnsiColor::Green));
            ui.field("GitHub", &profile.github_username);
            ui.field("Email", &profile.git_email);
            ui.field("SSH Host", ui.dim(&profile.ssh_host));
            ui.field("SSH Key", ui.dim(profile.ssh_key_path.display().to_string()));
        }
        None => {
            ui.println("Active Profile: none");
            ui.hint("Use 'gh-switch use <profile>' to activate a profile.");
        }
    }

    let or_unset = |v: &str| {
        if v.is_empty() {
            ui.dim("(not set)")
        } else {
            v.to_string()
        }
    };

    ui.newline();
    ui.println("Global Git Config:");
    ui.field("user.name", or_unset(&identity.name));
    ui.field("user.email", or_unset(&identity.email));

    if let Some(profile) = doc.active()
        && identity.is_set()
        && (identity.name != profile.git_name || identity.email != profile.git_email)
    {
        ui.newline();
        ui.warn("Global git config does not match the active profile.");
        ui.hint(format!("Run 'gh-switch use {}' to sync it.", profile.name));
    }

    Ok(())
}

/// Show the configuration file, or open it in an editor
pub fn config(paths: &Paths, edit: bool, ui: &Ui) -> Result<()> {
    let store = store(paths);
    if !store.exists() {
        ui.warn("Configuration file does not exist yet.");
        ui.hint("Run 'gh-switch init' to create it.");
        return Ok(());
    }

    if edit {
        open_in_editor(store.path())?;
        ui.ok(format!("Opened {} in editor", store.path().display()));
        return Ok(());
    }

    let doc = store.load()?;

    ui.section("Configuration");
    ui.field("File", store.path().display().to_string());
    ui.field("Version", &doc.version);
    ui.newline();

    if doc.profiles.is_empty() {
        ui.println(ui.dim("No profiles configured"));
    } else {
        let mut table = ui.simple_table();
        for profile in &doc.profiles {
            let marker = if doc.active_profile.as_deref() == Some(profile.name.as_str()) {
                ui.icon_active()
            } else {
                ""
            };
            table.add_row(vec![ui.cell(marker), ui.header_cell(&profile.name)]);
            table.add_row(vec![ui.cell(""), ui.cell(format!("GitHub: {}", profile.github_username))]);
            table.add_row(vec![ui.cell(""), ui.cell(format!("Email: {}", profile.git_email))]);
            table.add_row(vec![ui.cell(""), ui.cell(format!("SSH Host: {}", profile.ssh_host))]);
            table.add_row(vec![
                ui.cell(""),
                ui.cell(format!("SSH Key: {}", profile.ssh_key_path.display())),
            ]);
        }
        ui.println(table.to_string());
    }

    ui.newline();
    ui.field(
        "Active Profile",
        doc.active_profile.as_deref().unwrap_or("none"),
    );
    ui.hint("Use 'gh-switch config --edit' to edit the configuration file.");

    Ok(())
}

/// Editor command: `$EDITOR`, then `$VISUAL`, then a platform default
fn editor_command() -> String {
    ["EDITOR", "VISUAL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            if cfg!(windows) { "notepad" } else { "nano" }.to_string()
        })
}

/// Open a file in the user's editor
fn open_in_editor(path: &Path) -> Result<()> {
    let editor = editor_command();
    tracing::debug!(%editor, path = %path.display(), "opening editor");

    let status = Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| {
            format!(
                "Failed to run editor: {}\nHint: Set $EDITOR, or edit {} directly.",
                editor,
                path.display()
            )
        })?;

    if !status.success() {
        bail!("Editor exited with non-zero status");
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// use / clone / verify / remove
// -----------------------------------------------------------------------------

/// Switch the global git identity to a profile
pub fn use_profile(paths: &Paths, system: &dyn System, name: Option<&str>, ui: &Ui) -> Result<()> {
    require_git(system)?;

    let store = store(paths);
    let doc = store.load()?;
    let Some(name) = resolve_profile_name(&doc, name, "Select a profile to switch to:")? else {
        print_no_profiles(ui);
        return Ok(());
    };

    let spinner = ui.spinner(format!("Switching to profile '{}'...", name));
    let profile = match activate(&store, system, &name) {
        Ok(profile) => profile,
        Err(e) => {
            ui.spinner_finish_err(&spinner, "Failed to switch profile");
            return Err(e.into());
        }
    };
    ui.spinner_finish_ok(&spinner, format!("Switched to profile: {}", profile.name));

    ui.newline();
    ui.println("Global git config updated:");
    ui.field("user.name", &profile.git_name);
    ui.field("user.email", &profile.git_email);
    ui.field("GitHub", &profile.github_username);
    ui.field("SSH Host", ui.dim(&profile.ssh_host));
    ui.newline();
    ui.hint("Use 'gh-switch clone <url>' to clone repos with this profile.");

    Ok(())
}

/// Pick the profile for `clone` when none was named
fn clone_profile_name(doc: &ConfigDocument) -> Result<String> {
    let fallback = doc.active().or_else(|| match doc.profiles.as_slice() {
        [only] => Some(only),
        _ => None,
    });

    if !interactive() {
        return match fallback {
            Some(profile) => Ok(profile.name.clone()),
            None => bail!("No active profile.\nHint: Name the profile to clone with, or run 'gh-switch use <profile>'."),
        };
    }

    if let Some(profile) = fallback {
        let use_default = Confirm::new(&format!(
            "Clone with profile '{}' ({})?",
            profile.name, profile.github_username
        ))
        .with_default(true)
        .prompt()
        .context("Confirmation cancelled")?;
        if use_default {
            return Ok(profile.name.clone());
        }
    }

    select_profile(doc, "Select a profile to use:")
}

/// Clone a repository through a profile's SSH host alias and pin its local identity
pub fn clone(
    paths: &Paths,
    system: &dyn System,
    url: &str,
    profile: Option<&str>,
    dest: Option<&Path>,
    ui: &Ui,
) -> Result<()> {
    require_git(system)?;

    let doc = store(paths).load()?;
    if doc.profiles.is_empty() {
        print_no_profiles(ui);
        return Ok(());
    }

    let name = match profile {
        Some(name) => name.to_string(),
        None => clone_profile_name(&doc)?,
    };
    let profile = doc.get(&name).ok_or_else(|| Error::NotFound(name.clone()))?;

    let repo_dir = match dest {
        Some(dest) => dest.to_path_buf(),
        None => match repo_dir_name(url) {
            Some(dir) => PathBuf::from(dir),
            None => bail!(
                "Cannot derive a directory name from '{}'.\nHint: Pass a destination directory.",
                url
            ),
        },
    };

    let ssh_url = rewrite_git_url(url, &profile.ssh_host);

    ui.println("Cloning repository:");
    ui.field("Repository", url);
    ui.field("Profile", format!("{} ({})", profile.name, profile.github_username));
    ui.field("Using SSH URL", ui.dim(&ssh_url));
    ui.newline();

    let spinner = ui.spinner("Cloning...");
    if let Err(e) = system.clone_repo(&ssh_url, dest) {
        ui.spinner_finish_err(&spinner, "Failed to clone repository");
        ui.hint(format!(
            "Make sure the SSH key is added to GitHub. Run 'gh-switch verify {}' to test the connection.",
            profile.name
        ));
        return Err(e.into());
    }
    ui.spinner_finish_ok(&spinner, "Repository cloned");

    system.set_local_identity(&repo_dir, &profile.git_name, &profile.git_email)?;

    ui.newline();
    ui.println("Local git config set:");
    ui.field("user.name", &profile.git_name);
    ui.field("user.email", &profile.git_email);
    ui.field("Directory", repo_dir.display().to_string());

    Ok(())
}

/// Probe SSH authentication for one or all profiles
pub fn verify(paths: &Paths, system: &dyn System, name: Option<&str>, ui: &Ui) -> Result<()> {
    let doc = store(paths).load()?;
    if doc.profiles.is_empty() {
        print_no_profiles(ui);
        return Ok(());
    }

    let targets: Vec<&Profile> = match name {
        Some(name) => vec![doc.get(name).ok_or_else(|| Error::NotFound(name.to_string()))?],
        None => doc.profiles.iter().collect(),
    };

    ui.section("Verifying SSH connections to GitHub");
    ui.newline();

    let ssh = ssh_file(paths);
    let mut failed = 0usize;
    for profile in &targets {
        if ssh.find(&profile.ssh_host)?.is_none() {
            failed += 1;
            ui.err(format!(
                "{}: no entry for {} in {}",
                profile.name,
                profile.ssh_host,
                ssh.path().display()
            ));
            ui.hint(format!("Run 'gh-switch add --force --name {}' to restore it.", profile.name));
            continue;
        }

        let spinner = ui.spinner(format!(
            "Testing {} ({})...",
            profile.name, profile.github_username
        ));
        let probe = system.probe_ssh(&profile.ssh_host, SSH_PROBE_TIMEOUT);
        if probe.success {
            ui.spinner_finish_ok(&spinner, format!("{}: {}", profile.name, probe.raw_message));
        } else {
            failed += 1;
            ui.spinner_finish_err(&spinner, format!("{}: {}", profile.name, probe.raw_message));
        }
    }

    ui.newline();
    ui.section("Summary");
    ui.println(format!(
        "  {} Successful: {}",
        ui.colored(ui.icon_ok(), AnsiColor::Green),
        targets.len() - failed
    ));
    ui.println(format!(
        "  {} Failed: {}",
        ui.colored(ui.icon_err(), AnsiColor::Red),
        failed
    ));

    if failed > 0 {
        ui.newline();
        ui.println("Troubleshooting:");
        ui.println("  1. Ensure the SSH key is added to the GitHub account");
        ui.println("  2. Check the SSH key path in the profile ('gh-switch config')");
        ui.println("  3. Key permissions should be 600 or 400 ('gh-switch doctor')");
        ui.println("  4. Test manually: ssh -T git@<ssh-host>");
        bail!("{} of {} profile(s) failed SSH verification", failed, targets.len());
    }

    Ok(())
}

/// Remove a profile and its SSH host entry; the key file is kept
pub fn remove(paths: &Paths, name: Option<&str>, yes: bool, ui: &Ui) -> Result<()> {
    let store = store(paths);
    let doc = store.load()?;
    let Some(name) = resolve_profile_name(&doc, name, "Select a profile to remove:")? else {
        ui.warn("No profiles configured yet. Nothing to remove.");
        return Ok(());
    };
    let profile = doc.get(&name).ok_or_else(|| Error::NotFound(name.clone()))?;

    if !yes {
        if !interactive() {
            bail!("Refusing to remove '{}' without confirmation.\nHint: Pass --yes to confirm.", name);
        }

        ui.warn("You are about to remove the following profile:");
        ui.field("Name", &profile.name);
        ui.field("GitHub", &profile.github_username);
        ui.field("Email", &profile.git_email);
        ui.field("SSH Host", &profile.ssh_host);

        let confirm = Confirm::new("Are you sure you want to remove this profile?")
            .with_default(false)
            .prompt()
            .context("Confirmation cancelled")?;
        if !confirm {
            ui.println(ui.dim("Cancelled. No changes made."));
            return Ok(());
        }
    }

    let removal = unregister_profile(&store, &ssh_file(paths), &name)?;

    ui.ok(format!("Removed profile '{}'", removal.profile.name));
    if removal.ssh_entry_removed {
        ui.println(ui.dim(format!("SSH config entry {} removed.", removal.profile.ssh_host)));
    }
    ui.println(ui.dim(format!(
        "The SSH key {} was not deleted.",
        removal.profile.ssh_key_path.display()
    )));
    match removal.active_profile {
        Some(active) if doc.active_profile.as_deref() == Some(name.as_str()) => {
            ui.info(format!("Active profile is now '{}'", active));
            ui.hint(format!("Run 'gh-switch use {}' to update the global git identity.", active));
        }
        None => ui.info("No active profile."),
        _ => {}
    }

    Ok(())
}

/// Run diagnostics; fails when any check reports an issue
pub fn doctor(paths: &Paths, system: &dyn System, ui: &Ui) -> Result<()> {
    let issues = run_doctor(paths, system, ui);
    if issues > 0 {
        bail!("doctor found {} issue(s)", issues);
    }
    Ok(())
}
