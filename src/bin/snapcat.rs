//! Snapshot Catalogue CLI (snapcat) - Main binary entry point

use snapcat::cli::args::{
    CATALOGUE_ENV, CliArgs, Command, CreateArgs, ExportArgs, ListArgs, SearchArgs, ShowArgs,
    parse_args,
};
use snapcat::cli::output::{
    format_list_json, format_list_text, format_search_json, format_search_text,
    format_snapshot_json, format_snapshot_text,
};
use snapcat::{
    Error, SearchParams, Snapshot, SnapshotCatalogue, SnapshotSearcher, SnapshotSettings,
    SnapshotUtils, SortBy,
};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug snapcat list
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let catalogue = match open_catalogue(&cli_args) {
        Ok(c) => c,
        Err(code) => process::exit(code),
    };

    let result = match &cli_args.command {
        Command::List(a) => handle_list(&catalogue, a),
        Command::Show(a) => handle_show(&catalogue, a),
        Command::Create(a) => handle_create(&catalogue, a),
        Command::Delete(id) => handle_delete(&catalogue, id),
        Command::Duplicate(id) => handle_duplicate(&catalogue, id),
        Command::Install(id) => handle_install(&catalogue, id),
        Command::Uninstall(id) => handle_uninstall(&catalogue, id),
        Command::Export(a) => handle_export(&catalogue, a),
        Command::Import(archive) => handle_import(&catalogue, archive),
        Command::Search(a) => handle_search(&catalogue, a),
    };

    let exit_code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code(&e)
        }
    };
    process::exit(exit_code);
}

fn exit_code(e: &Error) -> i32 {
    match e {
        Error::InvalidInput(_)
        | Error::DuplicateId(_)
        | Error::IdMismatch { .. }
        | Error::MissingDataKey(_)
        | Error::InvalidArchive(_) => 2,
        Error::NotFound(_) => 3,
        _ => 4,
    }
}

fn open_catalogue(args: &CliArgs) -> Result<SnapshotCatalogue, i32> {
    let Some(path) = args
        .catalogue
        .clone()
        .or_else(|| std::env::var(CATALOGUE_ENV).ok())
    else {
        eprintln!("Error: no catalogue folder given");
        eprintln!("Pass --catalogue <DIR> or set {CATALOGUE_ENV}");
        return Err(2);
    };

    let settings = match args.config.as_deref() {
        Some(config) => SnapshotSettings::load(Path::new(config)).map_err(|e| {
            eprintln!("Error: cannot load settings from {config}: {e}");
            exit_code(&e)
        })?,
        None => SnapshotSettings::default(),
    };

    SnapshotCatalogue::new(PathBuf::from(&path), settings).map_err(|e| {
        eprintln!("Error: cannot open catalogue {path}: {e}");
        exit_code(&e)
    })
}

fn require(catalogue: &SnapshotCatalogue, id: &str) -> snapcat::Result<Snapshot> {
    catalogue
        .get_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("Snapshot '{id}' not found in catalogue")))
}

fn handle_list(catalogue: &SnapshotCatalogue, args: &ListArgs) -> snapcat::Result<()> {
    let sort_by = SortBy::from_str(&args.sort).map_err(Error::InvalidInput)?;

    let mut scan = catalogue.scan()?;
    SnapshotUtils::sort_snapshots(&mut scan.snapshots, sort_by, args.reverse);

    if args.json {
        println!("{}", format_list_json(&scan.snapshots, &scan.skipped));
    } else {
        format_list_text(&scan.snapshots, &scan.skipped);
    }
    Ok(())
}

fn handle_show(catalogue: &SnapshotCatalogue, args: &ShowArgs) -> snapcat::Result<()> {
    let snapshot = require(catalogue, &args.id)?;
    if args.json {
        println!("{}", format_snapshot_json(&snapshot));
    } else {
        format_snapshot_text(&snapshot);
    }
    Ok(())
}

fn handle_create(catalogue: &SnapshotCatalogue, args: &CreateArgs) -> snapcat::Result<()> {
    let mut snapshot = Snapshot::with_random_id(
        catalogue.settings().id_length,
        args.name.clone(),
        args.desc.clone(),
    )
    .with_tags(&args.tags);
    if let Some(author) = &args.author {
        snapshot = snapshot.with_author(author.clone());
    }

    for dir in &args.dirs {
        let path = Path::new(dir);
        if !path.is_dir() {
            return Err(Error::InvalidInput(format!("{dir} is not a directory")));
        }
        snapshot.add_directory(std::path::absolute(path)?);
    }

    catalogue.add(&snapshot)?;
    println!("{}", snapshot.id);
    eprintln!(
        "Created snapshot '{}' with {} directories",
        snapshot.name,
        snapshot.directories.len()
    );
    Ok(())
}

fn handle_delete(catalogue: &SnapshotCatalogue, id: &str) -> snapcat::Result<()> {
    let snapshot = require(catalogue, id)?;
    catalogue.delete(&snapshot)?;
    eprintln!("Deleted snapshot {id}");
    Ok(())
}

fn handle_duplicate(catalogue: &SnapshotCatalogue, id: &str) -> snapcat::Result<()> {
    let copy = catalogue.duplicate_by_id(id)?;
    println!("{}", copy.id);
    eprintln!("Duplicated {id} as '{}'", copy.name);
    Ok(())
}

fn handle_install(catalogue: &SnapshotCatalogue, id: &str) -> snapcat::Result<()> {
    let snapshot = require(catalogue, id)?;
    catalogue.install(&snapshot)?;
    eprintln!(
        "Installed {} directories of snapshot {id}",
        snapshot.directories.len()
    );
    Ok(())
}

fn handle_uninstall(catalogue: &SnapshotCatalogue, id: &str) -> snapcat::Result<()> {
    require(catalogue, id)?;
    let removed = catalogue.remove_installed_copies(id)?;
    eprintln!("Removed {removed} installed directories of snapshot {id}");
    Ok(())
}

fn handle_export(catalogue: &SnapshotCatalogue, args: &ExportArgs) -> snapcat::Result<()> {
    let dest = Path::new(&args.dest);
    let archive = if args.dirs_only {
        catalogue.export_assoc_dirs(&args.id, dest)?
    } else {
        catalogue.export_snapshot(&args.id, dest)?
    };
    println!("{}", archive.display());
    Ok(())
}

fn handle_import(catalogue: &SnapshotCatalogue, archive: &str) -> snapcat::Result<()> {
    let snapshot = catalogue.import_snapshot(Path::new(archive))?;
    println!("{}", snapshot.id);
    eprintln!("Imported snapshot '{}'", snapshot.name);
    Ok(())
}

fn handle_search(catalogue: &SnapshotCatalogue, args: &SearchArgs) -> snapcat::Result<()> {
    let snapshots = if args.ids.is_empty() {
        catalogue.get_all()?
    } else {
        args.ids
            .iter()
            .map(|id| require(catalogue, id))
            .collect::<snapcat::Result<Vec<_>>>()?
    };

    let params = if args.regex {
        SearchParams::regex(args.query.clone())
    } else {
        SearchParams::text(args.query.clone())
    }
    .with_extensions(&args.extensions);

    let searcher = SnapshotSearcher::new(catalogue);
    let results = searcher.search_list_with_progress(&snapshots, &params, |p| {
        log::trace!(
            "[{}/{}] {}",
            p.current_index,
            p.total_files,
            p.current_file.display()
        );
    });

    if args.json {
        println!("{}", format_search_json(&results));
    } else {
        format_search_text(&results);
    }
    Ok(())
}

fn print_help() {
    println!("Snapshot Catalogue CLI (snapcat) - Versioned copies of directory sets");
    println!();
    println!("USAGE:");
    println!("    snapcat [--catalogue <DIR>] [--config <FILE>] <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    list                      List snapshots in the catalogue");
    println!("    show <ID>                 Show one snapshot");
    println!("    create <NAME> <DIR>...    Copy directories into a new snapshot");
    println!("    delete <ID>               Remove a snapshot and its stored copies");
    println!("    duplicate <ID>            Copy a snapshot under a new id");
    println!("    install <ID>              Restore stored copies over the original paths");
    println!("    uninstall <ID>            Delete the installed copies at the original paths");
    println!("    export <ID> <DEST_DIR>    Write a zip archive of a snapshot");
    println!("    import <ARCHIVE>          Register a snapshot from an exported archive");
    println!("    search <QUERY>            Search the stored files line by line");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    --catalogue <DIR>         Catalogue folder (default: ${CATALOGUE_ENV})");
    println!("    --config <FILE>           JSON settings file (backups, json filename, id length)");
    println!("    -h, --help                Show this help message");
    println!("    -v, --version             Show version information");
    println!();
    println!("LIST OPTIONS:");
    println!("    --sort <FIELD>            name|created|modified|size (default: name)");
    println!("    --reverse                 Reverse the order");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("CREATE OPTIONS:");
    println!("    --desc <TEXT>             Description");
    println!("    --author <NAME>           Author (default: UnknownUser)");
    println!("    --tag <TAG>               Add a tag (repeatable)");
    println!();
    println!("EXPORT OPTIONS:");
    println!("    --dirs-only               Archive only the directories, without metadata");
    println!();
    println!("SEARCH OPTIONS:");
    println!("    --regex                   Treat QUERY as a regular expression");
    println!("    --ext <EXT>               Only search files with this extension (repeatable)");
    println!("    --id <ID>                 Only search this snapshot (repeatable)");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("EXAMPLES:");
    println!("    snapcat --catalogue ~/.snaps create \"before upgrade\" ~/.config/app --tag app");
    println!("    snapcat --catalogue ~/.snaps list --sort modified --reverse");
    println!("    snapcat --catalogue ~/.snaps search 'timeout\\s*=' --regex --ext toml");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("snapcat {VERSION}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
