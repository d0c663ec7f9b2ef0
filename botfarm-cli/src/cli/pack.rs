use std::fs::{File, OpenOptions, read_dir};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use botfarm_api::bots;
use clap::Args;
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::{self, Context};
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct PackArgs {
    /// name of the bot
    pub name: String,

    /// directory containing the bot source files
    #[arg(long)]
    pub path: PathBuf,

    /// credentials file bundled into the archive as "zuliprc"
    #[arg(long)]
    pub config: PathBuf,

    /// entry point of the bot, relative to the bot directory
    #[arg(long, value_name = "FILE")]
    pub main: String,
}

/// packages the bot directory, the credentials file, and the generated
/// deploy config into a single archive under the local state directory
pub fn pack(state: &AppState, args: PackArgs) -> error::Result<PathBuf> {
    super::check_name(&args.name)?;

    if !args.path.is_dir() {
        return Err(error::Error::new().context(format!(
            "bot directory not found at {}",
            args.path.display()
        )));
    }

    if !args.config.is_file() {
        return Err(error::Error::new().context(format!(
            "credentials file not found at {}",
            args.config.display()
        )));
    }

    let main_path = args.path.join(&args.main);

    if !main_path.is_file() {
        return Err(error::Error::new().context(format!(
            "bot main file not found at {}",
            main_path.display()
        )));
    }

    std::fs::create_dir_all(&state.state_dir)
        .context("failed to create the local bots directory")?;

    let archive_path = state.archive_path(&args.name);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&archive_path)
        .context("failed to create the bot package")?;

    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    // breadth first walk of the bot directory
    let mut dir_queue = Vec::with_capacity(1);
    dir_queue.push(read_dir(&args.path)
        .context("failed to read the bot directory")?);

    while let Some(iter) = dir_queue.pop() {
        for item in iter {
            let entry = item.context("failed to read the bot directory")?;
            let entry_path = entry.path();
            let entry_type = entry.file_type()
                .context("failed to read the file type of a bot file")?;

            if entry_type.is_file() {
                let name = entry_name(&args.path, &entry_path)?;

                // the fixed entries are always written from their own
                // sources. a bot file with the same name cannot win
                if name == bots::CREDENTIALS_ENTRY || name == bots::CONFIG_ENTRY {
                    tracing::debug!(entry = %name, "bot file shadows a reserved entry");
                    continue;
                }

                tracing::debug!(entry = %name, "adding bot file");

                writer.start_file(name, options)?;

                let mut src = File::open(&entry_path)
                    .context("failed to open a bot file for reading")?;

                std::io::copy(&mut src, &mut writer)
                    .context("failed to write a bot file into the package")?;
            } else if entry_type.is_dir() {
                dir_queue.push(read_dir(&entry_path)
                    .context("failed to read a bot subdirectory")?);
            } else {
                tracing::debug!(
                    path = %entry_path.display(),
                    "skipping non regular file"
                );
            }
        }
    }

    writer.start_file(bots::CREDENTIALS_ENTRY, options)?;

    let mut credentials = File::open(&args.config)
        .context("failed to open the credentials file")?;

    std::io::copy(&mut credentials, &mut writer)
        .context("failed to write the credentials file into the package")?;

    writer.start_file(bots::CONFIG_ENTRY, options)?;
    writer.write_all(bots::deploy_config(&args.main).as_bytes())
        .context("failed to write the deploy config into the package")?;

    let mut inner = writer.finish()
        .context("failed to finish the bot package")?;

    inner.flush()
        .context("failed to flush the bot package")?;

    println!("created bot package at {}", archive_path.display());

    Ok(archive_path)
}

/// archive entry name for a bot file. entries are always stored with
/// forward slash separators no matter the platform
fn entry_name(root: &Path, path: &Path) -> error::Result<String> {
    let rel = path.strip_prefix(root)
        .ok()
        .context("bot file is outside of the bot directory")?;

    let mut name = String::new();

    for component in rel.components() {
        let part = component.as_os_str()
            .to_str()
            .context("a bot file name contains invalid utf-8 characters")?;

        if !name.is_empty() {
            name.push('/');
        }

        name.push_str(part);
    }

    Ok(name)
}

/// removes the package for the given bot name. a missing package is
/// reported but is not an error so the command stays idempotent
pub fn clean(state: &AppState, name: &str) -> error::Result {
    super::check_name(name)?;

    let archive_path = state.archive_path(name);

    match std::fs::remove_file(&archive_path) {
        Ok(()) => println!("removed {}", archive_path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            println!("no bot package found at {}", archive_path.display());
        },
        Err(err) => {
            return Err(error::Error::new()
                .context(format!("failed to remove {}", archive_path.display()))
                .source(err));
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Read;
    use std::path::Path;

    use super::*;

    fn test_state(root: &Path) -> AppState {
        AppState {
            state_dir: root.join("bots"),
            server: AppState::DEFAULT_SERVER.into(),
            key: None,
        }
    }

    fn write_bot_dir(root: &Path) -> PathBuf {
        let bot_dir = root.join("helloworld");

        std::fs::create_dir_all(bot_dir.join("assets")).unwrap();
        std::fs::write(bot_dir.join("bot.py"), "print('hello')\n").unwrap();
        std::fs::write(bot_dir.join("requirements.txt"), "requests\n").unwrap();
        std::fs::write(bot_dir.join("assets").join("reply.txt"), "hello\n").unwrap();

        bot_dir
    }

    fn write_credentials(root: &Path) -> PathBuf {
        let config = root.join("creds");

        std::fs::write(&config, "[api]\nemail=bot@example.com\nkey=abc123\n").unwrap();

        config
    }

    fn pack_args(bot_dir: &Path, config: &Path) -> PackArgs {
        PackArgs {
            name: "helloworld".into(),
            path: bot_dir.to_owned(),
            config: config.to_owned(),
            main: "bot.py".into(),
        }
    }

    fn archive_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entries = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).unwrap();
            let mut content = Vec::new();

            entry.read_to_end(&mut content).unwrap();
            entries.push((entry.name().to_owned(), content));
        }

        entries
    }

    fn entry<'a>(entries: &'a [(String, Vec<u8>)], name: &str) -> &'a [u8] {
        let mut found = entries.iter().filter(|(given, _)| given == name);

        let (_, content) = found.next()
            .unwrap_or_else(|| panic!("missing entry {:?}", name));

        assert!(found.next().is_none(), "duplicate entry {:?}", name);

        content
    }

    #[test]
    fn pack_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let bot_dir = write_bot_dir(tmp.path());
        let config = write_credentials(tmp.path());

        let archive_path = pack(&state, pack_args(&bot_dir, &config)).unwrap();

        assert_eq!(archive_path, state.archive_path("helloworld"));

        let entries = archive_entries(&archive_path);
        let mut names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
        names.sort();

        assert_eq!(names, [
            "assets/reply.txt",
            "bot.py",
            "config.ini",
            "requirements.txt",
            "zuliprc",
        ]);

        assert_eq!(entry(&entries, "bot.py"), b"print('hello')\n");
        assert_eq!(entry(&entries, "requirements.txt"), b"requests\n");
        assert_eq!(entry(&entries, "assets/reply.txt"), b"hello\n");
        assert_eq!(entry(&entries, "zuliprc"), b"[api]\nemail=bot@example.com\nkey=abc123\n");
        assert_eq!(entry(&entries, "config.ini"), b"bot=bot.py\nzuliprc=zuliprc\n");
    }

    #[test]
    fn pack_reserved_names_stay_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let bot_dir = write_bot_dir(tmp.path());
        let config = write_credentials(tmp.path());

        std::fs::write(bot_dir.join("zuliprc"), "shadowed\n").unwrap();
        std::fs::write(bot_dir.join("config.ini"), "shadowed\n").unwrap();

        let archive_path = pack(&state, pack_args(&bot_dir, &config)).unwrap();
        let entries = archive_entries(&archive_path);

        assert_eq!(
            entry(&entries, "zuliprc"),
            b"[api]\nemail=bot@example.com\nkey=abc123\n"
        );
        assert_eq!(entry(&entries, "config.ini"), b"bot=bot.py\nzuliprc=zuliprc\n");
    }

    #[test]
    fn pack_missing_bot_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let config = write_credentials(tmp.path());

        let args = pack_args(&tmp.path().join("missing"), &config);
        let err = pack(&state, args).unwrap_err();

        assert!(
            err.to_string().contains("bot directory not found"),
            "unexpected error {}",
            err
        );
    }

    #[test]
    fn pack_missing_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let bot_dir = write_bot_dir(tmp.path());

        let args = pack_args(&bot_dir, &tmp.path().join("missing"));
        let err = pack(&state, args).unwrap_err();

        assert!(
            err.to_string().contains("credentials file not found"),
            "unexpected error {}",
            err
        );
    }

    #[test]
    fn pack_missing_main_file() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let bot_dir = write_bot_dir(tmp.path());
        let config = write_credentials(tmp.path());

        let mut args = pack_args(&bot_dir, &config);
        args.main = "missing.py".into();

        let err = pack(&state, args).unwrap_err();

        assert!(
            err.to_string().contains("bot main file not found"),
            "unexpected error {}",
            err
        );
    }

    #[test]
    fn clean_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let bot_dir = write_bot_dir(tmp.path());
        let config = write_credentials(tmp.path());

        let archive_path = pack(&state, pack_args(&bot_dir, &config)).unwrap();

        assert!(archive_path.try_exists().unwrap());

        clean(&state, "helloworld").unwrap();

        assert!(!archive_path.try_exists().unwrap());

        // second run reports a missing package and still succeeds
        clean(&state, "helloworld").unwrap();
    }
}
